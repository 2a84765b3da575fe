use catalog_core::db::open_db_in_memory;
use catalog_core::{
    CatalogService, CatalogStats, CatalogSummary, Categorie, NewFood, NewImage, NewIngredient,
    NewPersonne, PersonneDeletePolicy, TypeIngredient, VariantCount,
};
use rusqlite::Connection;

fn service(conn: &Connection) -> CatalogService<'_> {
    CatalogService::try_new(conn, PersonneDeletePolicy::Cascade).unwrap()
}

fn set_timestamp(conn: &Connection, table: &str, column: &str, id: i64, value: i64) {
    conn.execute(
        &format!("UPDATE {table} SET {column} = ?1 WHERE id = ?2;"),
        [value, id],
    )
    .unwrap();
}

#[test]
fn most_used_ingredients_ranks_by_usage_and_honors_top() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let foods = (1..=3)
        .map(|n| {
            service
                .create_food(&NewFood::new(format!("Plat {n}"), "PROTEINES"))
                .unwrap()
                .id
        })
        .collect::<Vec<_>>();
    let a = service
        .create_ingredient(&NewIngredient::new("A", "NATUREL"))
        .unwrap();
    let b = service
        .create_ingredient(&NewIngredient::new("B", "NATUREL"))
        .unwrap();
    service
        .create_ingredient(&NewIngredient::new("C", "TRANSFORME"))
        .unwrap();

    for food_id in &foods {
        service
            .add_ingredient_to_food(*food_id, a.id, 1.0, "g")
            .unwrap();
    }
    service
        .add_ingredient_to_food(foods[1], b.id, 1.0, "g")
        .unwrap();

    let top_two = service.most_used_ingredients(Some(2)).unwrap();
    let ranked = top_two
        .iter()
        .map(|entry| (entry.item.nom.as_str(), entry.count))
        .collect::<Vec<_>>();
    assert_eq!(ranked, vec![("A", 3), ("B", 1)]);

    // Unused ingredients never appear, even unbounded.
    assert_eq!(service.most_used_ingredients(None).unwrap().len(), 2);

    assert_eq!(
        service.count_ingredients_by_type().unwrap(),
        vec![
            VariantCount {
                variant: TypeIngredient::Naturel,
                count: 2
            },
            VariantCount {
                variant: TypeIngredient::Transforme,
                count: 1
            },
            VariantCount {
                variant: TypeIngredient::Synthetique,
                count: 0
            },
        ]
    );
}

#[test]
fn ranking_ties_break_by_ascending_id() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let first = service.create_food(&NewFood::new("Premier", "FRUITS")).unwrap();
    let second = service.create_food(&NewFood::new("Second", "FRUITS")).unwrap();
    let sel = service
        .create_ingredient(&NewIngredient::new("Sel", "NATUREL"))
        .unwrap();
    let poivre = service
        .create_ingredient(&NewIngredient::new("Poivre", "NATUREL"))
        .unwrap();

    service.add_ingredient_to_food(second.id, sel.id, 1.0, "g").unwrap();
    service.add_ingredient_to_food(second.id, poivre.id, 1.0, "g").unwrap();
    service.add_ingredient_to_food(first.id, poivre.id, 1.0, "g").unwrap();
    service.add_ingredient_to_food(first.id, sel.id, 1.0, "g").unwrap();

    let foods = service.foods_with_most_ingredients(None).unwrap();
    let food_ids = foods.iter().map(|entry| entry.item.id).collect::<Vec<_>>();
    assert_eq!(food_ids, vec![first.id, second.id]);
    assert!(foods.iter().all(|entry| entry.count == 2));

    let ingredients = service.most_used_ingredients(None).unwrap();
    let ingredient_ids = ingredients
        .iter()
        .map(|entry| entry.item.id)
        .collect::<Vec<_>>();
    assert_eq!(ingredient_ids, vec![sel.id, poivre.id]);
}

#[test]
fn recency_orders_by_timestamp_then_id_descending() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let ids = ["a@example.com", "b@example.com", "c@example.com"]
        .iter()
        .map(|email| {
            service
                .create_personne(&NewPersonne::new("Nom", "Prenom", *email))
                .unwrap()
                .id
        })
        .collect::<Vec<_>>();
    set_timestamp(&conn, "personnes", "date_creation", ids[0], 5_000);
    set_timestamp(&conn, "personnes", "date_creation", ids[1], 1_000);
    set_timestamp(&conn, "personnes", "date_creation", ids[2], 5_000);

    let recent = service.recent_personnes(Some(2)).unwrap();
    let recent_ids = recent.iter().map(|personne| personne.id).collect::<Vec<_>>();
    assert_eq!(recent_ids, vec![ids[2], ids[0]]);

    let all = service.recent_personnes(None).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[2].id, ids[1]);
}

#[test]
fn recent_foods_and_images_use_their_timestamps() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let old = service.create_food(&NewFood::new("Ancien", "CEREALES")).unwrap();
    let new = service.create_food(&NewFood::new("Nouveau", "CEREALES")).unwrap();
    set_timestamp(&conn, "foods", "date_creation", old.id, 10);
    set_timestamp(&conn, "foods", "date_creation", new.id, 20);

    let foods = service.recent_foods(Some(1)).unwrap();
    assert_eq!(foods.len(), 1);
    assert_eq!(foods[0].id, new.id);

    let first = service
        .create_image(&NewImage::new("a.png", "/a", "image/png", 1))
        .unwrap();
    let second = service
        .create_image(&NewImage::new("b.png", "/b", "image/png", 1))
        .unwrap();
    set_timestamp(&conn, "images", "date_upload", first.id, 99);
    set_timestamp(&conn, "images", "date_upload", second.id, 50);

    let images = service.recent_images(None).unwrap();
    let image_ids = images.iter().map(|image| image.id).collect::<Vec<_>>();
    assert_eq!(image_ids, vec![first.id, second.id]);
}

#[test]
fn largest_images_and_total_storage() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    assert_eq!(service.total_image_storage().unwrap(), 0);

    let small = service
        .create_image(&NewImage::new("s.png", "/s", "image/png", 10))
        .unwrap();
    let big = service
        .create_image(&NewImage::new("b.png", "/b", "image/png", 900))
        .unwrap();
    let big_twin = service
        .create_image(&NewImage::new("t.png", "/t", "image/png", 900))
        .unwrap();
    let empty = service
        .create_image(&NewImage::new("e.png", "/e", "image/png", 0))
        .unwrap();

    let largest = service.largest_images(Some(3)).unwrap();
    let largest_ids = largest.iter().map(|image| image.id).collect::<Vec<_>>();
    assert_eq!(largest_ids, vec![big.id, big_twin.id, small.id]);
    assert!(!largest_ids.contains(&empty.id));

    assert_eq!(service.total_image_storage().unwrap(), 1_810);
}

#[test]
fn food_counts_cover_every_category() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    for (nom, categorie) in [("Pomme", "FRUITS"), ("Poire", " FRUITS "), ("Riz", "CEREALES")] {
        service.create_food(&NewFood::new(nom, categorie)).unwrap();
    }

    let counts = service.count_foods_by_categorie().unwrap();
    let as_pairs = counts
        .iter()
        .map(|entry| (entry.variant, entry.count))
        .collect::<Vec<_>>();
    assert_eq!(
        as_pairs,
        vec![
            (Categorie::Fruits, 2),
            (Categorie::Legumes, 0),
            (Categorie::Cereales, 1),
            (Categorie::Proteines, 0),
            (Categorie::ProduitsLaitiers, 0),
        ]
    );
}

#[test]
fn summary_counts_every_table() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let stats = CatalogStats::try_new(&conn).unwrap();
    assert_eq!(
        stats.catalog_summary().unwrap(),
        CatalogSummary {
            personnes: 0,
            foods: 0,
            ingredients: 0,
            associations: 0,
            images: 0,
            total_image_storage: 0,
        }
    );

    let owner = service
        .create_personne(&NewPersonne::new("Durand", "Alice", "alice@example.com"))
        .unwrap();
    let dish = service
        .create_food(&NewFood {
            personne_id: Some(owner.id),
            ..NewFood::new("Gratin", "LEGUMES")
        })
        .unwrap();
    let creme = service
        .create_ingredient(&NewIngredient::new("Creme", "TRANSFORME"))
        .unwrap();
    service.add_ingredient_to_food(dish.id, creme.id, 20.0, "cl").unwrap();
    service
        .create_image(&NewImage::new("g.jpg", "/g", "image/jpeg", 42).for_food(dish.id))
        .unwrap();

    let summary = service.catalog_summary().unwrap();
    assert_eq!(summary.personnes, 1);
    assert_eq!(summary.foods, 1);
    assert_eq!(summary.ingredients, 1);
    assert_eq!(summary.associations, 1);
    assert_eq!(summary.images, 1);
    assert_eq!(summary.total_image_storage, 42);
}

#[test]
fn enums_serialize_as_canonical_names() {
    assert_eq!(
        serde_json::to_string(&Categorie::ProduitsLaitiers).unwrap(),
        "\"PRODUITS_LAITIERS\""
    );
    assert_eq!(
        serde_json::to_string(&TypeIngredient::Synthetique).unwrap(),
        "\"SYNTHETIQUE\""
    );
    let parsed: TypeIngredient = serde_json::from_str("\"TRANSFORME\"").unwrap();
    assert_eq!(parsed, TypeIngredient::Transforme);
}
