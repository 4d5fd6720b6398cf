//! Garden geometry: world bounds and the fixed planting slots.

use rand::Rng;

use super::room::Position;

/// Half-extent of the square garden, in world units. Resources spawn with
/// x/z uniformly inside `[-GARDEN_EXTENT, GARDEN_EXTENT]`.
pub const GARDEN_EXTENT: f64 = 20.0;

/// A fixed planting location.
#[derive(Debug, Clone, Copy)]
pub struct FlowerSlot {
    pub id: &'static str,
    pub position: Position,
}

const fn slot(id: &'static str, x: f64, z: f64) -> FlowerSlot {
    FlowerSlot {
        id,
        position: Position { x, y: 0.0, z },
    }
}

/// The nine planting slots, a 3x3 grid at the center of the garden.
pub const FLOWER_SLOTS: [FlowerSlot; 9] = [
    slot("slot-1", -4.0, -4.0),
    slot("slot-2", 0.0, -4.0),
    slot("slot-3", 4.0, -4.0),
    slot("slot-4", -4.0, 0.0),
    slot("slot-5", 0.0, 0.0),
    slot("slot-6", 4.0, 0.0),
    slot("slot-7", -4.0, 4.0),
    slot("slot-8", 0.0, 4.0),
    slot("slot-9", 4.0, 4.0),
];

/// Look up the world position of a slot id. `None` means the id is not one
/// of the fixed slots.
pub fn slot_position(slot_id: &str) -> Option<Position> {
    FLOWER_SLOTS
        .iter()
        .find(|slot| slot.id == slot_id)
        .map(|slot| slot.position)
}

/// Uniformly random ground position for a spawned resource.
pub fn random_resource_position(rng: &mut impl Rng) -> Position {
    Position {
        x: rng.gen_range(-GARDEN_EXTENT..=GARDEN_EXTENT),
        y: 0.0,
        z: rng.gen_range(-GARDEN_EXTENT..=GARDEN_EXTENT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_lookup_finds_all_nine() {
        // テスト項目: 9 つの固定スロットすべてが検索できる
        for slot in FLOWER_SLOTS {
            assert!(slot_position(slot.id).is_some());
        }
    }

    #[test]
    fn test_slot_lookup_rejects_unknown_id() {
        // テスト項目: 固定スロット以外の ID は None を返す
        assert!(slot_position("slot-10").is_none());
        assert!(slot_position("").is_none());
    }

    #[test]
    fn test_random_positions_stay_in_bounds() {
        // テスト項目: 生成されるリソース座標が常に庭の範囲内に収まる
        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let p = random_resource_position(&mut rng);
            assert!(p.x.abs() <= GARDEN_EXTENT);
            assert!(p.z.abs() <= GARDEN_EXTENT);
            assert_eq!(p.y, 0.0);
        }
    }
}
