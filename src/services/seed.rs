// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;

use crate::error::Result;
use crate::services::categories::create_or_get_category;

/// Starter hierarchy: main category and its subcategories.
pub const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    ("Продукти", &["Супермаркет", "Ринок", "М'ясо", "Овочі/Фрукти"]),
    ("Транспорт", &["Пальне", "Ремонт", "Страховка", "Парковка"]),
    ("Розваги", &["Кіно", "Ресторани", "Подорожі", "Хобі"]),
    ("Житло", &["Оренда", "Комунальні", "Інтернет", "Меблі"]),
    ("Здоров'я", &["Ліки", "Лікар", "Спорт", "Страхування"]),
    ("Освіта", &["Книги", "Курси", "Канцелярія", "Абонементи"]),
    ("Одяг", &["Взуття", "Верхній одяг", "Нижня білизна", "Аксесуари"]),
    ("Інше", &[]),
];

fn category_count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))?)
}

/// Creates whatever part of [`DEFAULT_CATEGORIES`] is missing. Returns the
/// number of categories added; a second run adds nothing.
pub fn seed_default_categories(conn: &Connection) -> Result<usize> {
    let before = category_count(conn)?;
    let tx = conn.unchecked_transaction()?;
    for (main, children) in DEFAULT_CATEGORIES {
        let parent = create_or_get_category(&tx, main, None)?;
        for child in *children {
            create_or_get_category(&tx, child, Some(parent.id))?;
        }
    }
    tx.commit()?;
    let added = (category_count(conn)? - before).max(0) as usize;
    tracing::info!(added, "default categories seeded");
    Ok(added)
}
