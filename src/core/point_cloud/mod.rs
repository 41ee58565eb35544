use std::collections::HashMap;

use thiserror::Error;

use crate::core::attribute::{Attribute, AttributeId, AttributeType};
use crate::core::shared::{AttributeValueIdx, PointIdx};

/// A set of points with per-point attributes.
/// Every attribute is defined on exactly `num_points` points.
#[derive(Clone, Debug, PartialEq)]
pub struct PointCloud {
    num_points: usize,
    attributes: Vec<Attribute>,
}

impl PointCloud {
    pub fn new(num_points: usize) -> Self {
        Self {
            num_points,
            attributes: Vec::new(),
        }
    }

    #[inline]
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn get_attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Adds the attribute and assigns it the next id.
    pub fn add_attribute(&mut self, mut att: Attribute) -> Result<AttributeId, Err> {
        if att.len() != self.num_points {
            return Err(Err::AttributeLengthMismatch(att.get_attribute_type(), att.len(), self.num_points));
        }
        let id = AttributeId::new(self.attributes.len());
        att.set_id(id);
        self.attributes.push(att);
        Ok(id)
    }

    /// Returns the first attribute with the given role.
    pub fn get_named_attribute(&self, att_type: AttributeType) -> Option<&Attribute> {
        self.attributes.iter().find(|att| att.get_attribute_type() == att_type)
    }

    /// Merges bitwise identical values within each attribute.
    /// Returns the total number of removed values.
    pub fn deduplicate_attribute_values(&mut self) -> Result<usize, Err> {
        self.check_lengths()?;
        let mut num_removed = 0;
        for att in self.attributes.iter_mut() {
            let n = att.remove_duplicate_values();
            tracing::trace!("{:?}: merged {} duplicate values", att.get_attribute_type(), n);
            num_removed += n;
        }
        Ok(num_removed)
    }

    /// Merges points that use the same value in every attribute.
    /// Surviving points keep the order of their first occurrence.
    /// Returns the map from old point indices to new ones.
    pub fn deduplicate_point_ids(&mut self) -> Result<Vec<PointIdx>, Err> {
        self.check_lengths()?;

        let mut unique_points: HashMap<Vec<AttributeValueIdx>, PointIdx> = HashMap::with_capacity(self.num_points);
        // representative (old) point of every new point
        let mut representatives = Vec::new();
        let mut old_to_new = Vec::with_capacity(self.num_points);
        for p in 0..self.num_points {
            let p = PointIdx::from(p);
            let key = self.attributes.iter()
                .map(|att| att.get_att_idx(p))
                .collect::<Vec<_>>();
            let next = PointIdx::from(representatives.len());
            let new_idx = *unique_points.entry(key).or_insert_with(|| {
                representatives.push(p);
                next
            });
            old_to_new.push(new_idx);
        }

        let num_new_points = representatives.len();
        if num_new_points == self.num_points {
            return Ok(old_to_new);
        }

        for att in self.attributes.iter_mut() {
            let map = representatives.iter()
                .map(|&p| att.get_att_idx(p))
                .collect::<Vec<_>>();
            let is_identity = map.len() == att.num_unique_values()
                && map.iter().enumerate().all(|(i, &v)| usize::from(v) == i);
            att.set_point_to_att_val_map(if is_identity { None } else { Some(map) });
        }
        tracing::debug!("merged {} duplicate points", self.num_points - num_new_points);
        self.num_points = num_new_points;
        Ok(old_to_new)
    }

    fn check_lengths(&self) -> Result<(), Err> {
        for att in &self.attributes {
            if att.len() != self.num_points {
                return Err(Err::AttributeLengthMismatch(att.get_attribute_type(), att.len(), self.num_points));
            }
        }
        Ok(())
    }
}

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Err {
    #[error("Attribute {0:?} is defined on {1} points, but the point cloud has {2} points.")]
    AttributeLengthMismatch(AttributeType, usize, usize),
}
