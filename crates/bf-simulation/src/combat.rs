use bf_core::{EnergyChange, EntityId, Placed};
use tracing::debug;

use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::lifecycle;

/// Melee damage as a pure function of its four inputs.
///
/// Closer hits do more damage. `distance` is clamped to at least 1 so a hit
/// at zero distance stays finite.
pub fn damage(power: f64, energy: f64, armor: f64, distance: f64) -> f64 {
    let distance = distance.max(1.0);
    (power * 0.5 + energy * 0.3) / (armor * 0.3 * distance * 0.01) * 10.0
}

/// What an attack did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackOutcome {
    /// Attacker cannot act, or defender cannot be fought.
    Ignored,
    /// Defender is farther than the attacker's range.
    OutOfRange {
        /// Center-to-center distance.
        distance: f64,
    },
    /// The hit landed.
    Hit {
        /// Center-to-center distance.
        distance: f64,
        /// Damage before rounding.
        damage: f64,
        /// Defender energy afterwards.
        energy: i32,
        /// This hit killed the defender.
        killed: bool,
    },
}

pub(crate) fn attack(
    ctx: &mut SimContext<'_>,
    attacker_id: EntityId,
    defender_id: EntityId,
) -> SimResult<AttackOutcome> {
    let attacker = ctx.world.entity(attacker_id)?;
    let defender = ctx.world.entity(defender_id)?;
    if attacker_id == defender_id || !attacker.can_act() || !defender.is_alive() {
        return Ok(AttackOutcome::Ignored);
    }
    let (Some(a), Some(d)) = (attacker.stats(), defender.stats()) else {
        return Ok(AttackOutcome::Ignored);
    };

    let distance = attacker.distance_to(defender);
    if distance > a.attack_range {
        debug!(attacker = %attacker_id, defender = %defender_id, distance, "out of range");
        return Ok(AttackOutcome::OutOfRange { distance });
    }

    let dealt = damage(a.power, f64::from(attacker.energy()), d.armor, distance);
    let before = defender.energy();
    let description = format!(
        "{} hits {} for {dealt:.1} at {distance:.0}px",
        attacker.name, defender.name
    );

    let change = lifecycle::set_energy(ctx, defender_id, f64::from(before) - dealt)?;
    let energy = ctx.world.entity(defender_id)?.energy();
    ctx.emit(
        SimEventKind::Attacked {
            entity: defender_id,
            attacker: attacker_id,
            damage: dealt,
            energy,
        },
        description,
    );

    Ok(AttackOutcome::Hit {
        distance,
        damage: dealt,
        energy,
        killed: matches!(change, EnergyChange::Died { .. }),
    })
}
