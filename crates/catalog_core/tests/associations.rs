use catalog_core::db::open_db_in_memory;
use catalog_core::repo::association_repo::{AssociationRepository, SqliteAssociationRepository};
use catalog_core::{
    CatalogError, CatalogService, EntityKind, NewFood, NewIngredient, PersonneDeletePolicy,
};
use rusqlite::Connection;

struct Fixture {
    conn: Connection,
}

impl Fixture {
    fn new() -> Self {
        Self {
            conn: open_db_in_memory().unwrap(),
        }
    }

    fn service(&self) -> CatalogService<'_> {
        CatalogService::try_new(&self.conn, PersonneDeletePolicy::Cascade).unwrap()
    }

    fn food(&self, nom: &str) -> i64 {
        self.service()
            .create_food(&NewFood::new(nom, "LEGUMES"))
            .unwrap()
            .id
    }

    fn ingredient(&self, nom: &str) -> i64 {
        self.service()
            .create_ingredient(&NewIngredient::new(nom, "NATUREL"))
            .unwrap()
            .id
    }
}

#[test]
fn upsert_overwrites_quantity_and_unit_in_place() {
    let fixture = Fixture::new();
    let service = fixture.service();
    let soupe = fixture.food("Soupe");
    let carotte = fixture.ingredient("Carotte");
    let oignon = fixture.ingredient("Oignon");

    service
        .add_ingredient_to_food(soupe, carotte, 200.0, "g")
        .unwrap();
    service
        .add_ingredient_to_food(soupe, oignon, 1.0, "piece")
        .unwrap();
    let updated = service
        .add_ingredient_to_food(soupe, carotte, 0.3, " kg ")
        .unwrap();
    assert_eq!(updated.unite, "kg");

    let rows = service.ingredients_of_food(soupe).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].ingredient_id, carotte);
    assert_eq!(rows[0].quantite_utilisee, 0.3);
    assert_eq!(rows[0].unite, "kg");
    assert_eq!(rows[1].ingredient_id, oignon);
}

#[test]
fn upsert_rejects_missing_references_without_writing() {
    let fixture = Fixture::new();
    let service = fixture.service();
    let soupe = fixture.food("Soupe");
    let carotte = fixture.ingredient("Carotte");

    let err = service
        .add_ingredient_to_food(9_999, carotte, 1.0, "g")
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::ReferenceNotFound {
            kind: EntityKind::Food,
            id: 9_999
        }
    ));

    let err = service
        .add_ingredient_to_food(soupe, 9_999, 1.0, "g")
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::ReferenceNotFound {
            kind: EntityKind::Ingredient,
            id: 9_999
        }
    ));

    let repo = SqliteAssociationRepository::try_new(&fixture.conn).unwrap();
    assert!(repo.list_all().unwrap().is_empty());
}

#[test]
fn upsert_validates_quantity_and_unit() {
    let fixture = Fixture::new();
    let service = fixture.service();
    let soupe = fixture.food("Soupe");
    let carotte = fixture.ingredient("Carotte");

    for (quantity, unit, field) in [
        (0.0, "g", "quantite_utilisee"),
        (-2.0, "g", "quantite_utilisee"),
        (f64::NAN, "g", "quantite_utilisee"),
        (1.0, "  ", "unite"),
    ] {
        let err = service
            .add_ingredient_to_food(soupe, carotte, quantity, unit)
            .unwrap_err();
        match err {
            CatalogError::Validation { field: actual, .. } => assert_eq!(actual, field),
            other => panic!("unexpected error: {other}"),
        }
    }
    assert!(!service.food_uses_ingredient(soupe, carotte).unwrap());
}

#[test]
fn remove_is_idempotent() {
    let fixture = Fixture::new();
    let service = fixture.service();
    let soupe = fixture.food("Soupe");
    let carotte = fixture.ingredient("Carotte");
    service
        .add_ingredient_to_food(soupe, carotte, 2.0, "piece")
        .unwrap();

    assert!(service.remove_ingredient_from_food(soupe, carotte).unwrap());
    assert!(!service.remove_ingredient_from_food(soupe, carotte).unwrap());
    assert!(!service.food_uses_ingredient(soupe, carotte).unwrap());
    assert!(service.ingredients_of_food(soupe).unwrap().is_empty());
}

#[test]
fn listings_are_scoped_to_each_side() {
    let fixture = Fixture::new();
    let service = fixture.service();
    let soupe = fixture.food("Soupe");
    let gratin = fixture.food("Gratin");
    let carotte = fixture.ingredient("Carotte");
    let creme = fixture.ingredient("Creme");

    service.add_ingredient_to_food(gratin, creme, 20.0, "cl").unwrap();
    service.add_ingredient_to_food(soupe, carotte, 3.0, "piece").unwrap();
    service.add_ingredient_to_food(gratin, carotte, 2.0, "piece").unwrap();

    let using_carotte = service.foods_using_ingredient(carotte).unwrap();
    let food_ids = using_carotte
        .iter()
        .map(|row| row.food_id)
        .collect::<Vec<_>>();
    assert_eq!(food_ids, vec![soupe, gratin]);

    let in_gratin = service.ingredients_of_food(gratin).unwrap();
    let ingredient_ids = in_gratin
        .iter()
        .map(|row| row.ingredient_id)
        .collect::<Vec<_>>();
    assert_eq!(ingredient_ids, vec![creme, carotte]);
}

#[test]
fn bulk_cleanup_reports_removed_rows() {
    let fixture = Fixture::new();
    let service = fixture.service();
    let soupe = fixture.food("Soupe");
    let gratin = fixture.food("Gratin");
    let carotte = fixture.ingredient("Carotte");
    let creme = fixture.ingredient("Creme");
    service.add_ingredient_to_food(soupe, carotte, 3.0, "piece").unwrap();
    service.add_ingredient_to_food(gratin, carotte, 2.0, "piece").unwrap();
    service.add_ingredient_to_food(gratin, creme, 20.0, "cl").unwrap();

    let repo = SqliteAssociationRepository::try_new(&fixture.conn).unwrap();
    assert_eq!(repo.remove_all_for_ingredient(carotte).unwrap(), 2);
    assert_eq!(repo.remove_all_for_food(gratin).unwrap(), 1);
    assert_eq!(repo.remove_all_for_food(gratin).unwrap(), 0);
    assert!(repo.list_all().unwrap().is_empty());
}

#[test]
fn association_serializes_with_field_names() {
    let fixture = Fixture::new();
    let service = fixture.service();
    let soupe = fixture.food("Soupe");
    let carotte = fixture.ingredient("Carotte");
    let row = service
        .add_ingredient_to_food(soupe, carotte, 250.0, "g")
        .unwrap();

    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(json["food_id"], soupe);
    assert_eq!(json["ingredient_id"], carotte);
    assert_eq!(json["quantite_utilisee"], 250.0);
    assert_eq!(json["unite"], "g");
}
