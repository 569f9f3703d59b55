use kube::core::GroupVersionKind;
use kube::discovery::ApiResource;

use fluxdoc_domain::ResourceKind;

const KUSTOMIZE_GROUP: &str = "kustomize.toolkit.fluxcd.io";
const HELM_GROUP: &str = "helm.toolkit.fluxcd.io";
const SOURCE_GROUP: &str = "source.toolkit.fluxcd.io";

/// Group, version and plural served for each Flux kind.
fn coordinates(kind: ResourceKind) -> (&'static str, &'static str, &'static str) {
    match kind {
        ResourceKind::Kustomization => (KUSTOMIZE_GROUP, "v1", "kustomizations"),
        ResourceKind::HelmRelease => (HELM_GROUP, "v2", "helmreleases"),
        ResourceKind::GitRepository => (SOURCE_GROUP, "v1", "gitrepositories"),
        ResourceKind::OciRepository => (SOURCE_GROUP, "v1beta2", "ocirepositories"),
        ResourceKind::HelmRepository => (SOURCE_GROUP, "v1", "helmrepositories"),
        ResourceKind::HelmChart => (SOURCE_GROUP, "v1", "helmcharts"),
        ResourceKind::Bucket => (SOURCE_GROUP, "v1", "buckets"),
    }
}

pub fn api_resource(kind: ResourceKind) -> ApiResource {
    let (group, version, plural) = coordinates(kind);
    let gvk = GroupVersionKind::gvk(group, version, kind.as_str());
    ApiResource::from_gvk_with_plural(&gvk, plural)
}
