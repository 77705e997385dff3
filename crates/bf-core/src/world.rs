use std::collections::{BTreeMap, HashMap};

use crate::entity::{Entity, EntityId};
use crate::error::{CoreError, CoreResult};
use crate::food::Food;
use crate::geometry::Rect;
use crate::projectile::{Projectile, ProjectileId};

/// The battlefield model. Owns every entity, the food item, and every
/// projectile in flight.
///
/// Iteration over entities follows insertion order so that runs with the
/// same seed produce the same event sequence.
#[derive(Debug, Clone, Default)]
pub struct World {
    entities: HashMap<EntityId, Entity>,
    order: Vec<EntityId>,
    food: Option<Food>,
    projectiles: BTreeMap<ProjectileId, Projectile>,
    next_projectile_id: u64,

    // Indexes
    by_name_lower: HashMap<String, EntityId>,
}

impl World {
    /// An empty battlefield.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Entity CRUD
    // -----------------------------------------------------------------------

    /// Validate and add an entity. Returns the entity's ID.
    pub fn add_entity(&mut self, entity: Entity) -> CoreResult<EntityId> {
        entity.validate()?;
        let name_lower = entity.name.to_lowercase();
        if self.by_name_lower.contains_key(&name_lower) {
            return Err(CoreError::DuplicateName(entity.name.clone()));
        }

        let id = entity.id;
        self.by_name_lower.insert(name_lower, id);
        self.order.push(id);
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Get a reference to an entity by ID.
    pub fn get_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get a mutable reference to an entity by ID.
    pub fn get_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Like [`World::get_entity`], but a missing ID is an error.
    pub fn entity(&self, id: EntityId) -> CoreResult<&Entity> {
        self.entities.get(&id).ok_or(CoreError::EntityNotFound(id))
    }

    /// Like [`World::get_entity_mut`], but a missing ID is an error.
    pub fn entity_mut(&mut self, id: EntityId) -> CoreResult<&mut Entity> {
        self.entities
            .get_mut(&id)
            .ok_or(CoreError::EntityNotFound(id))
    }

    /// Find an entity by name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<&Entity> {
        self.by_name_lower
            .get(&name.to_lowercase())
            .and_then(|id| self.entities.get(id))
    }

    /// Find an entity ID by name (case-insensitive).
    pub fn find_id_by_name(&self, name: &str) -> Option<EntityId> {
        self.by_name_lower.get(&name.to_lowercase()).copied()
    }

    /// Remove an entity. Projectiles that pointed at it lose their target.
    pub fn remove_entity(&mut self, id: EntityId) -> CoreResult<Entity> {
        let entity = self
            .entities
            .remove(&id)
            .ok_or(CoreError::EntityNotFound(id))?;

        self.by_name_lower.remove(&entity.name.to_lowercase());
        self.order.retain(|eid| *eid != id);
        for projectile in self.projectiles.values_mut() {
            if projectile.target == Some(id) {
                projectile.target = None;
            }
        }
        Ok(entity)
    }

    /// Display name for an ID, or `"<unknown>"`.
    pub fn entity_name(&self, id: EntityId) -> &str {
        self.entities
            .get(&id)
            .map(|e| e.name.as_str())
            .unwrap_or("<unknown>")
    }

    /// All entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }

    /// All entity IDs in insertion order.
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.order.clone()
    }

    /// Number of entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // -----------------------------------------------------------------------
    // Food
    // -----------------------------------------------------------------------

    /// The food currently on the field, if any.
    pub fn food(&self) -> Option<&Food> {
        self.food.as_ref()
    }

    /// Put food on the field, returning whatever was there before.
    pub fn place_food(&mut self, food: Food) -> Option<Food> {
        self.food.replace(food)
    }

    /// Remove the food from the field.
    pub fn take_food(&mut self) -> Option<Food> {
        self.food.take()
    }

    // -----------------------------------------------------------------------
    // Projectiles
    // -----------------------------------------------------------------------

    /// Create a projectile in flight and return its ID.
    pub fn add_projectile(
        &mut self,
        owner: EntityId,
        target: Option<EntityId>,
        damage: i32,
        rect: Rect,
    ) -> ProjectileId {
        self.next_projectile_id += 1;
        let id = ProjectileId(self.next_projectile_id);
        self.projectiles
            .insert(id, Projectile::new(id, owner, target, damage, rect));
        id
    }

    /// Get a projectile by ID.
    pub fn projectile(&self, id: ProjectileId) -> Option<&Projectile> {
        self.projectiles.get(&id)
    }

    /// Get a projectile mutably by ID.
    pub fn projectile_mut(&mut self, id: ProjectileId) -> Option<&mut Projectile> {
        self.projectiles.get_mut(&id)
    }

    /// Remove a projectile.
    pub fn remove_projectile(&mut self, id: ProjectileId) -> CoreResult<Projectile> {
        self.projectiles
            .remove(&id)
            .ok_or(CoreError::ProjectileNotFound(id))
    }

    /// All projectiles, oldest first.
    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.values()
    }

    /// Number of projectiles, flying or awaiting removal.
    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }
}
