use lazy_static::lazy_static;

use crate::core::attribute::{AttributeType, ComponentDataType};
use super::header::{PlyElement, PlyProperty};
use super::Err;

/// When a group counts as present on the vertex element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Presence {
    /// every property must exist, otherwise decoding fails
    Required,
    /// every property must exist, otherwise the group is skipped
    All,
    /// the group is present iff the named property exists; then all properties must exist
    Probe(&'static str),
    /// any non-empty subset of the properties, in table order
    AnySubset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeRule {
    /// all properties share one of the listed types; anything else is fatal
    Uniform(&'static [ComponentDataType]),
    /// every present property has this type; anything else is fatal
    Strict(ComponentDataType),
    /// every property has this type; anything else skips the group
    Lenient(ComponentDataType),
}

/// One semantic attribute and the vertex properties it is stored in.
#[derive(Debug, Clone)]
pub(crate) struct AttributeGroup {
    pub att_type: AttributeType,
    pub property_names: Vec<String>,
    pub presence: Presence,
    pub types: TypeRule,
}

/// The properties a group was found in, and their common type.
#[derive(Debug)]
pub(crate) struct Selection<'a> {
    pub properties: Vec<&'a PlyProperty>,
    pub data_type: ComponentDataType,
}

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn indexed(prefix: &str, range: std::ops::Range<usize>) -> Vec<String> {
    range.map(|i| format!("{}{}", prefix, i)).collect()
}

lazy_static! {
    /// The attribute groups in header order. Decoding detects groups in this order and
    /// encoding writes header lines and point records in this order.
    pub(crate) static ref ATTRIBUTE_GROUPS: Vec<AttributeGroup> = vec![
        AttributeGroup {
            att_type: AttributeType::Position,
            property_names: names(&["x", "y", "z"]),
            presence: Presence::Required,
            types: TypeRule::Uniform(&[ComponentDataType::F32, ComponentDataType::I32]),
        },
        AttributeGroup {
            att_type: AttributeType::Normal,
            property_names: names(&["nx", "ny", "nz"]),
            presence: Presence::All,
            types: TypeRule::Lenient(ComponentDataType::F32),
        },
        AttributeGroup {
            att_type: AttributeType::Color,
            property_names: names(&["red", "green", "blue", "alpha"]),
            presence: Presence::AnySubset,
            types: TypeRule::Strict(ComponentDataType::U8),
        },
        AttributeGroup {
            att_type: AttributeType::ShBand0,
            property_names: indexed("f_dc_", 0..3),
            presence: Presence::All,
            types: TypeRule::Lenient(ComponentDataType::F32),
        },
        // The rest bands are probed by a single property each. The probe of band 2 is
        // f_rest_15 rather than the first property of its range.
        AttributeGroup {
            att_type: AttributeType::ShBand1,
            property_names: indexed("f_rest_", 0..9),
            presence: Presence::Probe("f_rest_0"),
            types: TypeRule::Lenient(ComponentDataType::F32),
        },
        AttributeGroup {
            att_type: AttributeType::ShBand2,
            property_names: indexed("f_rest_", 9..24),
            presence: Presence::Probe("f_rest_15"),
            types: TypeRule::Lenient(ComponentDataType::F32),
        },
        AttributeGroup {
            att_type: AttributeType::ShBand3,
            property_names: indexed("f_rest_", 24..45),
            presence: Presence::Probe("f_rest_24"),
            types: TypeRule::Lenient(ComponentDataType::F32),
        },
        AttributeGroup {
            att_type: AttributeType::Opacity,
            property_names: names(&["opacity"]),
            presence: Presence::All,
            types: TypeRule::Lenient(ComponentDataType::F32),
        },
        AttributeGroup {
            att_type: AttributeType::Scale,
            property_names: indexed("scale_", 0..3),
            presence: Presence::All,
            types: TypeRule::Lenient(ComponentDataType::F32),
        },
        AttributeGroup {
            att_type: AttributeType::Rotation,
            property_names: indexed("rot_", 0..4),
            presence: Presence::All,
            types: TypeRule::Lenient(ComponentDataType::F32),
        },
    ];
}

impl AttributeGroup {
    /// Looks the group up on `element`.
    /// Returns `Ok(None)` if the group is absent or skipped, and an error if it is
    /// malformed in a way that cannot be skipped.
    pub(crate) fn select<'a>(&self, element: &'a PlyElement) -> Result<Option<Selection<'a>>, Err> {
        if let Presence::Probe(probe) = self.presence {
            if element.get_property(probe).is_none() {
                return Ok(None);
            }
        }

        let mut properties = Vec::with_capacity(self.property_names.len());
        for name in &self.property_names {
            match element.get_property(name) {
                Some(p) => properties.push(p),
                None => match self.presence {
                    Presence::Required => return Err(Err::MissingRequiredProperty(name.clone())),
                    Presence::AnySubset => continue,
                    Presence::All | Presence::Probe(_) => {
                        if !properties.is_empty() || matches!(self.presence, Presence::Probe(_)) {
                            tracing::debug!("skipping {:?}: property '{}' is missing", self.att_type, name);
                        }
                        return Ok(None);
                    }
                },
            }
        }
        let Some(first) = properties.first() else {
            return Ok(None);
        };

        let data_type = match self.types {
            TypeRule::Uniform(allowed) => {
                let ty = first.data_type();
                if let Some(p) = properties.iter().find(|p| p.is_list() || p.data_type() != ty) {
                    return Err(Err::TypeMismatch(p.name().to_owned(), ty, p.data_type()));
                }
                if first.is_list() || !allowed.contains(&ty) {
                    return Err(Err::TypeMismatch(first.name().to_owned(), allowed[0], ty));
                }
                ty
            }
            TypeRule::Strict(ty) => {
                if let Some(p) = properties.iter().find(|p| p.is_list() || p.data_type() != ty) {
                    return Err(Err::TypeMismatch(p.name().to_owned(), ty, p.data_type()));
                }
                ty
            }
            TypeRule::Lenient(ty) => {
                if let Some(p) = properties.iter().find(|p| p.is_list() || p.data_type() != ty) {
                    tracing::debug!("skipping {:?}: property '{}' has type {:?}", self.att_type, p.name(), p.data_type());
                    return Ok(None);
                }
                ty
            }
        };

        Ok(Some(Selection { properties, data_type }))
    }

    /// Property names written to the header for an attribute with `num_components` components.
    pub(crate) fn header_names(&self, num_components: usize) -> &[String] {
        &self.property_names[..num_components.min(self.property_names.len())]
    }

    /// Whether values of type `ty` are read back by the decoder.
    pub(crate) fn accepts_type(&self, ty: ComponentDataType) -> bool {
        match self.types {
            TypeRule::Uniform(allowed) => allowed.contains(&ty),
            TypeRule::Strict(t) | TypeRule::Lenient(t) => t == ty,
        }
    }

    /// Whether an attribute with `num_components` components can be written as this group.
    pub(crate) fn accepts_num_components(&self, num_components: usize) -> bool {
        match self.att_type.num_components() {
            Some(n) => n == num_components,
            None => (1..=self.property_names.len()).contains(&num_components),
        }
    }
}
