use super::bundle::ProjectBundle;
use crate::error::BundleError;

/// A trait for foreign project formats that can be converted into a `ProjectBundle`.
///
/// Editors that store their funnel in their own shape (canvas nodes with positions,
/// database rows, and so on) implement this to hand the projection engine plain data.
///
/// # Example
///
/// ```rust
/// use funnelcast::error::BundleError;
/// use funnelcast::model::{IntoBundle, ProjectBundle, Stage};
///
/// struct CanvasNode { id: String, label: String, paid: bool }
/// struct Canvas { nodes: Vec<CanvasNode> }
///
/// impl IntoBundle for Canvas {
///     fn into_bundle(self) -> Result<ProjectBundle, BundleError> {
///         let stages = self
///             .nodes
///             .into_iter()
///             .map(|n| Stage::new(n.id, n.label, n.paid))
///             .collect();
///         Ok(ProjectBundle { stages, ..Default::default() })
///     }
/// }
///
/// let canvas = Canvas { nodes: vec![CanvasNode { id: "a".into(), label: "Visit".into(), paid: false }] };
/// assert_eq!(canvas.into_bundle().unwrap().stages.len(), 1);
/// ```
pub trait IntoBundle {
    /// Consumes the object and converts it into a projection-ready bundle.
    fn into_bundle(self) -> Result<ProjectBundle, BundleError>;
}

impl IntoBundle for ProjectBundle {
    fn into_bundle(self) -> Result<ProjectBundle, BundleError> {
        Ok(self)
    }
}

impl IntoBundle for &str {
    fn into_bundle(self) -> Result<ProjectBundle, BundleError> {
        ProjectBundle::from_json(self)
    }
}
