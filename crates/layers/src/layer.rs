#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerKind {
    Arcs,
    Points,
    Labels,
}

/// A complete, declarative binding for one renderer layer: data plus styling.
///
/// Renderers replace the whole binding for the layer's kind on every apply.
pub trait Layer {
    fn kind(&self) -> LayerKind;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
