//! Functionality to utilise a [`SurrealDb`](https://surrealdb.com) backend as a durable
//! [`BlobStore`] for saved grid views.

use std::rc::Rc;

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use surrealdb::{
    Connection, RecordId, Surreal,
    engine::{
        local::{Db, Mem},
        remote::ws::{Client, Ws},
    },
    opt::auth::Root,
};

use gridviews_core::BlobStore;

/// Every blob is a record in this table, keyed by the blob's key.
const BLOB_TABLE: &str = "blobs";

/// A single stored value. SurrealDb hands back the record `id` alongside the content.
#[derive(Serialize, Deserialize, Debug)]
struct Blob {
    #[serde(skip_serializing)]
    #[allow(dead_code)]
    id: Option<RecordId>,
    value: String,
}

/// An instance of a SurrealDb ready to use as a `BlobStore`
///
/// This requires some form of instantiation function, the exact specification of which will depend
/// on the type of `<C: Connection>` selected. See [`SurrealBlobStore::create`] for an in-memory Db
/// and [`SurrealBlobStore::connect`] for a remote one.
#[derive(Debug, Clone)]
pub struct SurrealBlobStore<C: Connection> {
    /// The instatiated Surreal Db `Connection`. This should be in an authenticated state with
    /// `namespace` & `database` already selected, so that functions such as `upsert()` can be
    /// called without further preamble.
    db: Surreal<C>,

    /// A dedicated tokio runtime. Blob store calls are blocking: a write issued while the page
    /// unloads has to be finished when `set` returns.
    rt: Rc<tokio::runtime::Runtime>,
}

impl<C: Connection> BlobStore for SurrealBlobStore<C> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let blob: Option<Blob> = self
            .rt
            .block_on(self.db.select((BLOB_TABLE, key.to_owned())).into_future())
            .with_context(|| format!("Reading {key} from SurrealDb"))?;
        Ok(blob.map(|blob| blob.value))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let blob = Blob {
            id: None,
            value: value.to_owned(),
        };
        let _: Option<Blob> = self
            .rt
            .block_on(
                self.db
                    .upsert((BLOB_TABLE, key.to_owned()))
                    .content(blob)
                    .into_future(),
            )
            .with_context(|| format!("Writing {key} to SurrealDb"))?;
        Ok(())
    }
}

/// Namespace and database selected on every connection.
const NAMESPACE: &str = "GridViews";

fn runtime(enable_time: bool) -> Result<tokio::runtime::Runtime> {
    debug!("Initialising tokio runtime");
    let mut builder = tokio::runtime::Builder::new_current_thread();
    if enable_time {
        builder.enable_time();
    }
    builder
        .build()
        .context("Initialising dedicated tokio runtime for surreal database.")
}

impl<C: Connection> SurrealBlobStore<C> {
    /// Take ownership of an authenticated connection, select [`NAMESPACE`] and keep `rt` alive for
    /// all later calls.
    fn open(rt: tokio::runtime::Runtime, db: Surreal<C>) -> Result<Self> {
        debug!("Selecting database namespace");
        rt.block_on(db.use_ns(NAMESPACE).use_db(NAMESPACE).into_future())
            .context("Selecting database namespace")?;
        debug!("Done connecting to database");
        Ok(Self { db, rt: Rc::new(rt) })
    }
}

/// Instantiate an in-memory Db with `ns` & `db` = "GridViews".
/// This is a blocking operation until the db is available.
impl SurrealBlobStore<Db> {
    pub fn create() -> Result<Self> {
        let rt = runtime(false)?;
        debug!("Initialising database");
        let db = rt
            .block_on(Surreal::new::<Mem>(()).into_future())
            .context("Initialising in memory database")?;
        Self::open(rt, db)
    }
}

impl SurrealBlobStore<Client> {
    pub fn connect(address: &str) -> Result<Self> {
        let rt = runtime(true)?;
        debug!("Connecting to database at {address}");
        let db = rt
            .block_on(Surreal::new::<Ws>(address).into_future())
            .with_context(|| format!("Connecting to database at {address}"))?;
        debug!("Signing in to database");
        rt.block_on(
            db.signin(Root {
                username: "root",
                password: "root",
            })
            .into_future(),
        )
        .context("Signing in to database")?;
        Self::open(rt, db)
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    #[fixture]
    fn store() -> SurrealBlobStore<Db> {
        SurrealBlobStore::create().unwrap()
    }

    #[rstest]
    fn get_absent(store: SurrealBlobStore<Db>) {
        assert_eq!(store.get("gridViews:customers").unwrap(), None);
    }

    #[rstest]
    fn set_then_get(store: SurrealBlobStore<Db>) {
        store.set("gridViews:customers", r#"{"views":{}}"#).unwrap();
        assert_eq!(
            store.get("gridViews:customers").unwrap().as_deref(),
            Some(r#"{"views":{}}"#)
        );
    }

    #[rstest]
    fn set_overwrites(store: SurrealBlobStore<Db>) {
        store.set("dataGridState", "first").unwrap();
        store.set("dataGridState", "second").unwrap();
        assert_eq!(
            store.get("dataGridState").unwrap().as_deref(),
            Some("second")
        );
    }

    #[rstest]
    fn keys_are_independent(store: SurrealBlobStore<Db>) {
        store.set("gridViews:customers", "c").unwrap();
        store.set("gridViews:orders", "o").unwrap();
        assert_eq!(store.get("gridViews:customers").unwrap().as_deref(), Some("c"));
        assert_eq!(store.get("gridViews:orders").unwrap().as_deref(), Some("o"));
    }

    #[rstest]
    fn namespace_selected(store: SurrealBlobStore<Db>) {
        let session: Option<String> = store
            .rt
            .block_on(store.db.query("RETURN session::ns()").into_future())
            .unwrap()
            .take(0)
            .unwrap();
        assert_eq!(session.as_deref(), Some(NAMESPACE));
    }

    #[test]
    fn stores_are_separate() {
        let first = SurrealBlobStore::create().unwrap();
        let second = SurrealBlobStore::create().unwrap();
        first.set("gridViews:customers", "c").unwrap();
        assert_eq!(second.get("gridViews:customers").unwrap(), None);
    }

    // #[test]
    // fn set_then_get_external_db() {
    //     let store = SurrealBlobStore::connect("localhost:8010").unwrap();
    //     store.set("gridViews:customers", "c").unwrap();
    //     assert_eq!(store.get("gridViews:customers").unwrap().as_deref(), Some("c"));
    // }
}
