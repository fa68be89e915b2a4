// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use kopiyka::Error;
use kopiyka::db::open_in_memory;
use kopiyka::services::categories::{
    add_category_from_form, category_overview, create_category, create_or_get_category,
    delete_category, find_main_category, find_subcategory, get_category, get_full_path,
    list_children, list_main_categories, promote_category, rename_category,
};
use kopiyka::services::ledgers::create_ledger;
use kopiyka::services::seed::seed_default_categories;
use kopiyka::services::transactions::{NewTransaction, create_transaction, get_transaction};
use kopiyka::services::users::create_user;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = open_in_memory().unwrap();
    seed_default_categories(&conn).unwrap();
    conn
}

#[test]
fn seeded_hierarchy_has_paths() {
    let conn = setup();
    let transport = find_main_category(&conn, "Транспорт").unwrap();
    let fuel = find_subcategory(&conn, "Пальне", Some(&transport)).unwrap();
    assert_eq!(fuel.parent_id, Some(transport.id));
    assert_eq!(get_full_path(&conn, &fuel).unwrap(), "Транспорт → Пальне");
    assert_eq!(get_full_path(&conn, &transport).unwrap(), "Транспорт");

    let names: Vec<String> = list_children(&conn, &transport)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, ["Пальне", "Парковка", "Ремонт", "Страховка"]);
}

#[test]
fn strict_create_rejects_duplicates() {
    let conn = setup();
    let transport = find_main_category(&conn, "Транспорт").unwrap();
    let err = create_category(&conn, "Пальне", Some(transport.id)).unwrap_err();
    match err {
        Error::DuplicateCategory { name, parent } => {
            assert_eq!(name, "Пальне");
            assert_eq!(parent.as_deref(), Some("Транспорт"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // the same name under another parent is fine
    let fun = find_main_category(&conn, "Розваги").unwrap();
    let other = create_category(&conn, "Пальне", Some(fun.id)).unwrap();
    assert_eq!(other.parent_id, Some(fun.id));
}

#[test]
fn get_or_create_reuses() {
    let conn = setup();
    let before = list_main_categories(&conn).unwrap().len();
    let a = create_or_get_category(&conn, "  Транспорт ", None).unwrap();
    let b = find_main_category(&conn, "Транспорт").unwrap();
    assert_eq!(a, b);
    assert_eq!(list_main_categories(&conn).unwrap().len(), before);
}

#[test]
fn depth_is_limited_to_two_levels() {
    let conn = setup();
    let fuel = find_subcategory(&conn, "Пальне", None).unwrap();
    let err = create_category(&conn, "Дизель", Some(fuel.id)).unwrap_err();
    assert!(matches!(err, Error::Validation { field: "parent", .. }));
    let err = create_or_get_category(&conn, "Дизель", Some(fuel.id)).unwrap_err();
    assert!(matches!(err, Error::Validation { field: "parent", .. }));
}

#[test]
fn form_parent_choices_are_exclusive() {
    let conn = setup();
    let home = find_main_category(&conn, "Житло").unwrap();
    let err = add_category_from_form(&conn, "Ремонт", Some(home.id), Some("Дім")).unwrap_err();
    assert!(matches!(err, Error::Validation { field: "parent", .. }));

    let pets = add_category_from_form(&conn, "Корм", None, Some("Тварини")).unwrap();
    assert_eq!(get_full_path(&conn, &pets).unwrap(), "Тварини → Корм");
    // the new parent is reused, the child is strict
    let vet = add_category_from_form(&conn, "Ветеринар", None, Some("Тварини")).unwrap();
    assert_eq!(vet.parent_id, pets.parent_id);
    assert!(add_category_from_form(&conn, "Корм", None, Some("Тварини")).is_err());
}

#[test]
fn ambiguous_subcategory_needs_parent() {
    let conn = setup();
    // "Страховка" under Транспорт, add another under Житло
    let home = find_main_category(&conn, "Житло").unwrap();
    create_category(&conn, "Страховка", Some(home.id)).unwrap();
    let err = find_subcategory(&conn, "Страховка", None).unwrap_err();
    assert!(matches!(err, Error::Validation { field: "subcategory", .. }));
    assert!(find_subcategory(&conn, "Страховка", Some(&home)).is_ok());
}

#[test]
fn rename_promote_delete() {
    let conn = setup();
    let parking = find_subcategory(&conn, "Парковка", None).unwrap();
    let renamed = rename_category(&conn, parking.id, "Стоянка").unwrap();
    assert_eq!(get_full_path(&conn, &renamed).unwrap(), "Транспорт → Стоянка");

    let fuel = find_subcategory(&conn, "Пальне", None).unwrap();
    assert!(matches!(
        rename_category(&conn, fuel.id, "Стоянка"),
        Err(Error::DuplicateCategory { .. })
    ));

    let promoted = promote_category(&conn, renamed.id).unwrap();
    assert!(promoted.is_main());
    assert_eq!(get_full_path(&conn, &promoted).unwrap(), "Стоянка");

    let transport = find_main_category(&conn, "Транспорт").unwrap();
    delete_category(&conn, transport.id).unwrap();
    assert!(get_category(&conn, fuel.id).unwrap_err().is_not_found());
    assert!(delete_category(&conn, transport.id).unwrap_err().is_not_found());
}

#[test]
fn overview_lists_children_after_parent() {
    let conn = setup();
    let overview = category_overview(&conn).unwrap();
    assert_eq!(overview.len(), 36);
    let pos = |path: &str| overview.iter().position(|c| c.path == path).unwrap();
    assert!(pos("Транспорт") < pos("Транспорт → Пальне"));
    let transport = &overview[pos("Транспорт")];
    assert_eq!(transport.subcategories, 4);
    assert_eq!(transport.transactions, 0);
}

#[test]
fn deleting_a_category_detaches_its_transactions() {
    let conn = setup();
    let who = create_user(&conn, "u@example.com").unwrap().id;
    let ledger = create_ledger(&conn, who, "Квітень", None).unwrap().id;
    let transport = find_main_category(&conn, "Транспорт").unwrap();
    let fuel = find_subcategory(&conn, "Пальне", Some(&transport)).unwrap();

    let mut tx = NewTransaction::new(ledger, Decimal::new(100, 0));
    tx.category_id = Some(fuel.id);
    let saved = create_transaction(&conn, who, &tx).unwrap();

    delete_category(&conn, transport.id).unwrap();
    assert!(get_category(&conn, fuel.id).unwrap_err().is_not_found());
    let kept = get_transaction(&conn, who, saved.id).unwrap();
    assert_eq!(kept.category_id, None);
    assert_eq!(kept.amount, Decimal::new(100, 0));
}
