#![allow(dead_code)]

use std::path::Path;

use libris_app::app::App;
use libris_app::modules::authors::models::{Author, NewAuthor};
use libris_app::modules::books::models::{Book, NewBook};
use libris_app::RecordStore;
use libris_kernel::settings::{DatabaseSettings, Settings};

pub fn settings() -> Settings {
    Settings {
        database: DatabaseSettings::in_memory(),
        ..Settings::default()
    }
}

/// Fresh in-memory database with every module migration applied.
pub async fn app() -> App {
    let app = App::connect(&settings()).await.expect("connect");
    app.migrate().await.expect("migrate");
    app
}

pub async fn store() -> RecordStore {
    app().await.store
}

/// Migrated database file inside `dir`, using the default pool size.
pub async fn file_store(dir: &Path) -> RecordStore {
    let settings = Settings {
        database: DatabaseSettings {
            url: format!("sqlite://{}?mode=rwc", dir.join("libris.db").display()),
            ..DatabaseSettings::default()
        },
        ..Settings::default()
    };
    let app = App::connect(&settings).await.expect("connect");
    app.migrate().await.expect("migrate");
    app.store
}

pub async fn author(store: &RecordStore, name: &str) -> Author {
    store
        .create_author(NewAuthor {
            name: name.to_string(),
            ..NewAuthor::default()
        })
        .await
        .expect("create author")
}

pub async fn book(store: &RecordStore, new: NewBook) -> Book {
    store.create_book(new).await.expect("create book")
}

pub fn titled(title: &str) -> NewBook {
    NewBook {
        title: title.to_string(),
        ..NewBook::default()
    }
}
