use log::debug;
use specs::prelude::Entity;

use crate::{
    combat,
    ecs::components::{Equipment, UsableItem},
    effects::UseOutcome,
    gamelog::{BAD, GOOD, WARN},
    world::WorldState,
};

/// Picks up the first carryable thing under the player. Usable items go to
/// the inventory, gear to the equipment bag. Returns whether anything moved.
pub fn pick_up(world: &mut WorldState) -> bool {
    let point = world.ecs.player_point();
    let Some(item) = world.ecs.entities_at(point).into_iter().find(|entity| {
        world.ecs.has::<UsableItem>(*entity) || world.ecs.has::<Equipment>(*entity)
    }) else {
        world.log.push("There is nothing here to pick up.", BAD);
        return false;
    };

    let name = world.ecs.name(item);
    let is_gear = world.ecs.has::<Equipment>(item);
    let (held, capacity) = if is_gear {
        (world.equipment.len(), world.config.equipment_capacity)
    } else {
        (world.inventory.len(), world.config.inventory_capacity)
    };
    if held >= capacity {
        debug!("refused pickup of {name}: {held}/{capacity}");
        world
            .log
            .push(format!("Your pack is full; you cannot pick up the {name}."), BAD);
        return false;
    }

    world.ecs.remove_from_map(item);
    if is_gear {
        world.equipment.push(item);
    } else {
        world.inventory.push(item);
    }
    world.log.push(format!("You pick up the {name}."), GOOD);
    true
}

pub fn drop_item(world: &mut WorldState, index: usize) -> bool {
    if index >= world.inventory.len() {
        return false;
    }
    let item = world.inventory.remove(index);
    place_at_player(world, item);
    true
}

/// Drops gear, taking it off first if worn.
pub fn drop_gear(world: &mut WorldState, index: usize) -> bool {
    let Some(&item) = world.equipment.get(index) else {
        return false;
    };
    if world.ecs.get::<Equipment>(item).is_some_and(|gear| gear.equipped) {
        set_equipped(world, item, false);
    }
    world.equipment.remove(index);
    combat::clamp_player(world);
    place_at_player(world, item);
    true
}

fn place_at_player(world: &mut WorldState, item: Entity) {
    let point = world.ecs.player_point();
    world.ecs.place_on_map(item, point);
    let name = world.ecs.name(item);
    world.log.push(format!("You drop the {name}."), WARN);
}

/// Uses an inventory item; it is destroyed unless the effect was cancelled.
pub fn use_item(world: &mut WorldState, index: usize) -> UseOutcome {
    let Some(&item) = world.inventory.get(index) else {
        return UseOutcome::Cancelled;
    };
    let Some(effect) = world.ecs.get::<UsableItem>(item).and_then(|usable| usable.effect) else {
        let name = world.ecs.name(item);
        world.log.push(format!("You can't use the {name}."), BAD);
        return UseOutcome::Cancelled;
    };

    let outcome = effect.apply(world);
    if outcome == UseOutcome::Consumed {
        world.inventory.retain(|held| *held != item);
        world.ecs.despawn(item);
    }
    outcome
}

/// Equips or takes off one piece of gear. Whatever else occupied the slot
/// comes off first.
pub fn toggle_equip(world: &mut WorldState, index: usize) -> bool {
    let Some(&item) = world.equipment.get(index) else {
        return false;
    };
    let Some(gear) = world.ecs.get::<Equipment>(item) else {
        return false;
    };

    if gear.equipped {
        set_equipped(world, item, false);
    } else {
        let rivals: Vec<Entity> = world
            .equipment
            .iter()
            .copied()
            .filter(|other| {
                *other != item
                    && world
                        .ecs
                        .get::<Equipment>(*other)
                        .is_some_and(|g| g.equipped && g.slot == gear.slot)
            })
            .collect();
        for rival in rivals {
            set_equipped(world, rival, false);
        }
        set_equipped(world, item, true);
    }
    combat::clamp_player(world);
    true
}

fn set_equipped(world: &mut WorldState, item: Entity, equipped: bool) {
    let Some(slot) = world.ecs.with_mut::<Equipment, _>(item, |gear| {
        gear.equipped = equipped;
        gear.slot
    }) else {
        return;
    };
    let name = world.ecs.name(item);
    if equipped {
        world
            .log
            .push(format!("You equip the {name} on your {}.", slot.as_str()), GOOD);
    } else {
        world
            .log
            .push(format!("You take off the {name}."), WARN);
    }
}
