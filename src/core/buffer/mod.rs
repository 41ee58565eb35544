/// Typed storage backing [`crate::core::attribute::Attribute`].
pub(crate) mod attribute;
