//! Plant types seeded into every fresh database.

use uuid::Uuid;

use crate::db::GardenStore;
use crate::error::Result;
use crate::model::PlantType;

#[allow(clippy::too_many_arguments)]
fn entry(
    name: &str,
    description: &str,
    icon: &str,
    growth_time: i32,
    (water_needs, fertilizer_needs): (i32, i32),
    (yield_amount, harvest_value, experience_value): (i32, i32, i32),
    min_level: i32,
    (season, weather, rarity): (&str, &str, &str),
) -> PlantType {
    PlantType {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        growth_time,
        water_needs,
        fertilizer_needs,
        yield_amount,
        harvest_value,
        experience_value,
        min_level,
        season: season.to_string(),
        weather: weather.to_string(),
        rarity: rarity.to_string(),
    }
}

pub fn tomato() -> PlantType {
    entry(
        "Tomato",
        "A juicy red tomato that grows well in warm weather",
        "🍅",
        120,
        (60, 20),
        (3, 15, 10),
        1,
        ("summer", "sunny", "common"),
    )
}

pub fn carrot() -> PlantType {
    entry(
        "Carrot",
        "An orange root vegetable that grows underground",
        "🥕",
        90,
        (50, 10),
        (2, 12, 8),
        1,
        ("spring", "all", "common"),
    )
}

pub fn lettuce() -> PlantType {
    entry(
        "Lettuce",
        "A leafy green vegetable that grows quickly",
        "🥬",
        60,
        (70, 5),
        (1, 8, 5),
        1,
        ("spring", "cloudy", "common"),
    )
}

pub fn strawberry() -> PlantType {
    entry(
        "Strawberry",
        "A sweet red berry that requires careful tending",
        "🍓",
        180,
        (80, 30),
        (2, 25, 15),
        3,
        ("spring", "sunny", "uncommon"),
    )
}

pub fn golden_apple() -> PlantType {
    entry(
        "Golden Apple",
        "A rare golden apple with magical properties",
        "🍎",
        360,
        (90, 50),
        (1, 100, 50),
        10,
        ("autumn", "sunny", "legendary"),
    )
}

pub fn default_catalog() -> Vec<PlantType> {
    vec![tomato(), carrot(), lettuce(), strawberry(), golden_apple()]
}

/// Insert the default catalog. Entries already present by name are kept as is.
pub async fn seed_catalog<S: GardenStore>(store: &S) -> Result<Vec<PlantType>> {
    let mut seeded = Vec::new();
    for plant_type in default_catalog() {
        seeded.push(store.ensure_plant_type(&plant_type).await?);
    }
    tracing::info!(count = seeded.len(), "plant catalog seeded");
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[test]
    fn catalog_names_are_unique() {
        let catalog = default_catalog();
        let mut names: Vec<&str> = catalog.iter().map(|t| t.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), catalog.len());
        assert!(catalog.iter().all(|t| t.growth_time > 0));
    }

    #[tokio::test]
    async fn seeding_twice_keeps_first_ids() {
        let store = MemoryStore::new();
        let first = seed_catalog(&store).await.unwrap();
        let second = seed_catalog(&store).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.plant_types().await.unwrap().len(), 5);
    }
}
