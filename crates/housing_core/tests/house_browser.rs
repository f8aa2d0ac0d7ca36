use housing_core::db::open_db_in_memory;
use housing_core::{
    load_dependents, Address, EntityKind, Garage, House, HouseBrowser, HousingStore,
    MemoryHousingStore, NewAddress, NewGarage, NewHouse, RepoError, Repository, Selection,
    ServiceError, SqliteHousingStore, StoreOp, UnitOfWork, FLOORS_OPTIONS,
};
use rusqlite::Connection;

struct Seeded {
    ann: House,
    ben: House,
    cid: House,
    ann_addresses: Vec<Address>,
    ann_garages: Vec<Garage>,
    ben_address: Address,
}

fn seed<S: HousingStore>(store: &S) -> Seeded {
    let ann = Repository::<House>::add(store, &NewHouse::new("Ann", 1999, 88.5, 2)).unwrap();
    let ben = Repository::<House>::add(store, &NewHouse::new("Ben", 2001, 120.0, 3)).unwrap();
    let cid = Repository::<House>::add(store, &NewHouse::new("Cid", 2015, 64.0, 1)).unwrap();

    let ann_addresses = vec![
        Repository::<Address>::add(
            store,
            &NewAddress::new(ann.id, "Elm St 3", "Oslo", "0150", "NO").with_notes("front"),
        )
        .unwrap(),
        Repository::<Address>::add(
            store,
            &NewAddress::new(ann.id, "Elm St 3B", "Oslo", "0150", "NO"),
        )
        .unwrap(),
    ];
    let ben_address = Repository::<Address>::add(
        store,
        &NewAddress::new(ben.id, "Oak St 9", "Bergen", "5003", "NO"),
    )
    .unwrap();
    let ann_garages = vec![Repository::<Garage>::add(
        store,
        &NewGarage::new(ann.id, "detached", 24.0),
    )
    .unwrap()];
    Repository::<Garage>::add(store, &NewGarage::new(ben.id, "carport", 15.0)).unwrap();

    store.persist().unwrap();
    Seeded {
        ann,
        ben,
        cid,
        ann_addresses,
        ann_garages,
        ben_address,
    }
}

fn count_for_house(conn: &Connection, table: &str, house_id: i64) -> i64 {
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE house_id = ?1;"),
        [house_id],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn new_browser_loads_all_houses_and_floor_options() {
    let store = MemoryHousingStore::new();
    let seeded = seed(&store);
    let browser = HouseBrowser::new(store).unwrap();

    let ids: Vec<i64> = browser.houses().items().iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![seeded.ann.id, seeded.ben.id, seeded.cid.id]);
    assert_eq!(browser.floors_options(), (1..=10).collect::<Vec<i32>>());
    assert_eq!(FLOORS_OPTIONS, 1..=10);
    assert_eq!(browser.selection(), &Selection::Unselected);
    assert!(browser.addresses().is_empty());
    assert!(browser.garages().is_empty());
}

#[test]
fn selecting_house_loads_only_its_dependents() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteHousingStore::try_new(&conn).unwrap();
    let seeded = seed(&store);
    let mut browser = HouseBrowser::new(store).unwrap();

    assert!(!browser.selection().is_selected());
    browser.set_selected_house(Some(seeded.ann.clone())).unwrap();

    assert!(browser.selection().is_selected());
    assert_eq!(browser.selected_house(), Some(&seeded.ann));
    assert_eq!(browser.addresses().items(), seeded.ann_addresses.as_slice());
    assert_eq!(browser.garages().items(), seeded.ann_garages.as_slice());

    browser.set_selected_house(Some(seeded.cid.clone())).unwrap();
    assert!(browser.addresses().is_empty());
    assert!(browser.garages().is_empty());
}

#[test]
fn load_dependents_of_none_is_empty_and_clears_view() {
    let store = MemoryHousingStore::new();
    let seeded = seed(&store);

    let (addresses, garages) = load_dependents(&store, None).unwrap();
    assert!(addresses.is_empty());
    assert!(garages.is_empty());

    let mut browser = HouseBrowser::new(store).unwrap();
    browser.set_selected_house(Some(seeded.ben.clone())).unwrap();
    assert_eq!(browser.addresses().len(), 1);

    let (addresses, garages) = browser.load_dependents(None).unwrap();
    assert!(addresses.is_empty() && garages.is_empty());
    assert!(browser.addresses().is_empty());
    assert!(browser.garages().is_empty());

    browser.set_selected_house(None).unwrap();
    assert_eq!(browser.selection(), &Selection::Unselected);
    assert!(!browser.selection().is_selected());
}

#[test]
fn select_house_reloads_dependents_of_current_selection() {
    let store = MemoryHousingStore::new();
    let seeded = seed(&store);
    let mut browser = HouseBrowser::new(store).unwrap();
    browser.set_selected_house(Some(seeded.ben.clone())).unwrap();

    Repository::<Address>::add(
        browser.store(),
        &NewAddress::new(seeded.ben.id, "Oak St 11", "Bergen", "5003", "NO"),
    )
    .unwrap();
    browser.store().persist().unwrap();

    browser.select_house().unwrap();
    assert_eq!(browser.addresses().len(), 2);
    assert_eq!(browser.addresses().items()[0], seeded.ben_address);
}

#[test]
fn update_house_overwrites_mutable_fields_in_place() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteHousingStore::try_new(&conn).unwrap();
    let seeded = seed(&store);
    let mut browser = HouseBrowser::new(store).unwrap();
    browser.set_selected_house(Some(seeded.ben.clone())).unwrap();

    let mut edited = seeded.ben.clone();
    edited.owner = "Benedict".to_string();
    edited.year_built = 2002;
    edited.area = 125.25;
    edited.floors = 4;
    let updated = browser.update_house(&edited).unwrap();

    assert_eq!(updated, edited);
    assert_eq!(browser.houses().len(), 3);
    assert_eq!(browser.houses().items()[1], edited);
    assert_eq!(browser.houses().position_of(edited.id), Some(1));
    assert_eq!(browser.selected_house(), Some(&edited));
    assert_eq!(
        Repository::<House>::fetch_by_id(browser.store(), seeded.ben.id).unwrap(),
        Some(edited)
    );
    assert_eq!(browser.houses().items()[0], seeded.ann);
}

#[test]
fn update_of_unknown_house_changes_nothing() {
    let store = MemoryHousingStore::new();
    seed(&store);
    store.clear_journal();
    let mut browser = HouseBrowser::new(store).unwrap();
    let before = browser.snapshot();

    let ghost = NewHouse::new("Ghost", 1900, 10.0, 1).into_house(404);
    let err = browser.update_house(&ghost).unwrap_err();

    assert!(matches!(
        err,
        ServiceError::NotFound {
            kind: EntityKind::House,
            id: 404
        }
    ));
    assert_eq!(browser.snapshot(), before);
    assert!(browser.store().journal().is_empty());
    assert!(!browser.store().has_pending());
}

#[test]
fn update_address_and_garage_replace_view_elements() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteHousingStore::try_new(&conn).unwrap();
    let seeded = seed(&store);
    let mut browser = HouseBrowser::new(store).unwrap();
    browser.set_selected_house(Some(seeded.ann.clone())).unwrap();

    let mut address = seeded.ann_addresses[1].clone();
    address.street = "Elm St 5".to_string();
    address.notes = "moved".to_string();
    address.house_id = seeded.ben.id;
    let updated_address = browser.update_address(&address).unwrap();

    assert_eq!(updated_address.house_id, seeded.ann.id);
    assert_eq!(browser.addresses().len(), 2);
    assert_eq!(browser.addresses().items()[1], updated_address);
    assert_eq!(browser.addresses().items()[0], seeded.ann_addresses[0]);

    let mut garage = seeded.ann_garages[0].clone();
    garage.kind = "double".to_string();
    garage.size = 40.0;
    let updated_garage = browser.update_garage(&garage).unwrap();
    assert_eq!(browser.garages().items(), &[updated_garage]);
}

#[test]
fn delete_house_cascades_and_resets_selection() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteHousingStore::try_new(&conn).unwrap();
    let seeded = seed(&store);
    let mut browser = HouseBrowser::new(store).unwrap();
    browser.set_selected_house(Some(seeded.ann.clone())).unwrap();

    browser.delete().unwrap();

    assert_eq!(count_for_house(&conn, "addresses", seeded.ann.id), 0);
    assert_eq!(count_for_house(&conn, "garages", seeded.ann.id), 0);
    assert!(Repository::<House>::fetch_by_id(browser.store(), seeded.ann.id)
        .unwrap()
        .is_none());
    assert_eq!(count_for_house(&conn, "addresses", seeded.ben.id), 1);
    assert_eq!(count_for_house(&conn, "garages", seeded.ben.id), 1);

    let ids: Vec<i64> = browser.houses().items().iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![seeded.ben.id, seeded.cid.id]);
    assert!(browser.addresses().is_empty());
    assert!(browser.garages().is_empty());
    assert_eq!(browser.selection(), &Selection::Unselected);
}

#[test]
fn delete_removes_dependents_before_house() {
    let store = MemoryHousingStore::new();
    let seeded = seed(&store);
    store.clear_journal();
    let mut browser = HouseBrowser::new(store).unwrap();

    browser.delete_house(Some(&seeded.ann)).unwrap();

    assert_eq!(
        browser.store().journal(),
        vec![
            StoreOp::Remove {
                kind: EntityKind::Address,
                id: seeded.ann_addresses[0].id
            },
            StoreOp::Remove {
                kind: EntityKind::Address,
                id: seeded.ann_addresses[1].id
            },
            StoreOp::Remove {
                kind: EntityKind::Garage,
                id: seeded.ann_garages[0].id
            },
            StoreOp::Remove {
                kind: EntityKind::House,
                id: seeded.ann.id
            },
            StoreOp::Persist,
        ]
    );
}

#[test]
fn delete_of_none_is_a_repeatable_no_op() {
    let store = MemoryHousingStore::new();
    seed(&store);
    store.clear_journal();
    let mut browser = HouseBrowser::new(store).unwrap();
    let before = browser.snapshot();

    browser.delete_house(None).unwrap();
    browser.delete_house(None).unwrap();
    browser.delete().unwrap();

    assert_eq!(browser.snapshot(), before);
    assert!(browser.store().journal().is_empty());
}

#[test]
fn delete_of_unknown_house_returns_not_found_and_discards() {
    let store = MemoryHousingStore::new();
    seed(&store);
    let mut browser = HouseBrowser::new(store).unwrap();
    let before = browser.snapshot();

    let ghost = NewHouse::new("Ghost", 1900, 10.0, 1).into_house(404);
    let err = browser.delete_house(Some(&ghost)).unwrap_err();

    assert!(matches!(err, ServiceError::NotFound { id: 404, .. }));
    assert_eq!(browser.snapshot(), before);
    assert!(!browser.store().has_pending());
}

#[test]
fn persist_failure_leaves_view_and_store_unchanged() {
    let store = MemoryHousingStore::new();
    let seeded = seed(&store);
    let mut browser = HouseBrowser::new(store).unwrap();
    browser.set_selected_house(Some(seeded.ann.clone())).unwrap();
    browser.store().set_simulate_persist_error(true);
    let before = browser.snapshot();

    let mut edited = seeded.ann.clone();
    edited.owner = "Annabel".to_string();
    let update_err = browser.update_house(&edited).unwrap_err();
    assert!(matches!(
        update_err,
        ServiceError::Repo(RepoError::Unavailable(_))
    ));

    let delete_err = browser.delete().unwrap_err();
    assert!(matches!(
        delete_err,
        ServiceError::Repo(RepoError::Unavailable(_))
    ));

    assert_eq!(browser.snapshot(), before);
    browser.store().set_simulate_persist_error(false);
    assert_eq!(
        Repository::<House>::fetch_by_id(browser.store(), seeded.ann.id).unwrap(),
        Some(seeded.ann.clone())
    );
    assert_eq!(
        Repository::<Address>::fetch_all(browser.store()).unwrap().len(),
        3
    );
}

#[test]
fn invalid_edit_is_rejected_without_touching_view() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteHousingStore::try_new(&conn).unwrap();
    let seeded = seed(&store);
    let mut browser = HouseBrowser::new(store).unwrap();
    let before = browser.snapshot();

    let mut edited = seeded.cid.clone();
    edited.owner = "   ".to_string();
    let err = browser.update_house(&edited).unwrap_err();

    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(browser.snapshot(), before);
    assert!(!browser.store().has_pending());
}

#[test]
fn snapshot_serializes_for_presentation() {
    let store = MemoryHousingStore::new();
    let seeded = seed(&store);
    let mut browser = HouseBrowser::new(store).unwrap();
    browser.set_selected_house(Some(seeded.cid.clone())).unwrap();

    let json = serde_json::to_value(browser.snapshot()).unwrap();

    assert_eq!(json["houses"]["items"].as_array().unwrap().len(), 3);
    assert_eq!(json["selection"]["state"], "selected");
    assert_eq!(json["selection"]["house"]["owner"], "Cid");
    assert_eq!(json["floors_options"].as_array().unwrap().len(), 10);
}
