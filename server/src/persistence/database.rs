//! SQLite storage for players, owned heroes and skill levels.

use herowars_shared::{Catalog, Entity, ExpCurve, Hero, SessionKey};
use log::{debug, warn};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

/// Player row as stored in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRow {
    pub gold: u64,
    pub hero_cid: Option<String>,
}

/// Hero row as stored in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroRow {
    pub cid: String,
    pub level: u32,
    pub exp: u64,
}

/// Everything stored for one player, rebuilt against the catalog
#[derive(Debug)]
pub struct StoredPlayer {
    pub gold: u64,
    pub active_hero: Option<String>,
    pub heroes: Vec<Hero>,
}

const UPSERT_PLAYER: &str = "INSERT INTO players (steamid, gold, hero_cid) VALUES (?, ?, ?)
     ON CONFLICT (steamid) DO UPDATE SET
        gold = EXCLUDED.gold,
        hero_cid = EXCLUDED.hero_cid";

fn to_db(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_db(value: i64, column: &str) -> u64 {
    u64::try_from(value).unwrap_or_else(|_| {
        warn!("Negative {} value {} in database, reading as 0", column, value);
        0
    })
}

async fn write_hero(
    tx: &mut Transaction<'_, Sqlite>,
    steamid: &SessionKey,
    hero: &Hero,
) -> Result<(), sqlx::Error> {
    let conn: &mut SqliteConnection = tx;
    sqlx::query(
        "INSERT INTO heroes (steamid, cid, level, exp) VALUES (?, ?, ?, ?)
         ON CONFLICT (steamid, cid) DO UPDATE SET
            level = EXCLUDED.level,
            exp = EXCLUDED.exp",
    )
    .bind(steamid.as_str())
    .bind(hero.cid())
    .bind(i64::from(hero.level()))
    .bind(to_db(hero.exp()))
    .execute(&mut *conn)
    .await?;

    for skill in hero.skills() {
        sqlx::query(
            "INSERT INTO skills (steamid, hero_cid, cid, level) VALUES (?, ?, ?, ?)
             ON CONFLICT (steamid, hero_cid, cid) DO UPDATE SET
                level = EXCLUDED.level",
        )
        .bind(steamid.as_str())
        .bind(hero.cid())
        .bind(skill.cid())
        .bind(i64::from(skill.level()))
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Database connection wrapper
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database, creating the file when missing
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // A single long-lived connection keeps `sqlite::memory:` databases alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Create the tables if they do not exist yet
    pub async fn setup(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS players (
                steamid TEXT PRIMARY KEY NOT NULL,
                gold INTEGER NOT NULL DEFAULT 0,
                hero_cid TEXT
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS heroes (
                steamid TEXT NOT NULL,
                cid TEXT NOT NULL,
                level INTEGER NOT NULL DEFAULT 0,
                exp INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (steamid, cid)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS skills (
                steamid TEXT NOT NULL,
                hero_cid TEXT NOT NULL,
                cid TEXT NOT NULL,
                level INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (steamid, hero_cid, cid)
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Player Operations
    // =========================================================================

    pub async fn load_player(&self, steamid: &SessionKey) -> Result<Option<PlayerRow>, sqlx::Error> {
        let row = sqlx::query("SELECT gold, hero_cid FROM players WHERE steamid = ?")
            .bind(steamid.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| PlayerRow {
            gold: from_db(r.get("gold"), "gold"),
            hero_cid: r.get("hero_cid"),
        }))
    }

    pub async fn save_player(
        &self,
        steamid: &SessionKey,
        gold: u64,
        hero_cid: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(UPSERT_PLAYER)
            .bind(steamid.as_str())
            .bind(to_db(gold))
            .bind(hero_cid)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Hero Operations
    // =========================================================================

    pub async fn load_hero_rows(&self, steamid: &SessionKey) -> Result<Vec<HeroRow>, sqlx::Error> {
        let rows = sqlx::query("SELECT cid, level, exp FROM heroes WHERE steamid = ? ORDER BY cid")
            .bind(steamid.as_str())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| HeroRow {
                cid: r.get("cid"),
                level: u32::try_from(from_db(r.get("level"), "level")).unwrap_or(u32::MAX),
                exp: from_db(r.get("exp"), "exp"),
            })
            .collect())
    }

    pub async fn load_skill_levels(
        &self,
        steamid: &SessionKey,
        hero_cid: &str,
    ) -> Result<HashMap<String, u32>, sqlx::Error> {
        let rows = sqlx::query("SELECT cid, level FROM skills WHERE steamid = ? AND hero_cid = ?")
            .bind(steamid.as_str())
            .bind(hero_cid)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let level = from_db(r.get("level"), "skill level");
                (r.get("cid"), u32::try_from(level).unwrap_or(u32::MAX))
            })
            .collect())
    }

    /// Upsert a hero and every one of its skill levels in one transaction
    pub async fn save_hero(&self, steamid: &SessionKey, hero: &Hero) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        write_hero(&mut tx, steamid, hero).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Store a bought hero together with the player row that paid for it
    /// and now points at it. Either both land or neither does.
    pub async fn save_purchase(&self, steamid: &SessionKey, gold: u64, hero: &Hero) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        write_hero(&mut tx, steamid, hero).await?;
        sqlx::query(UPSERT_PLAYER)
            .bind(steamid.as_str())
            .bind(to_db(gold))
            .bind(hero.cid())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // Composite Operations
    // =========================================================================

    /// Load a player's stored state, skipping heroes missing from the catalog
    pub async fn load_stored(
        &self,
        steamid: &SessionKey,
        catalog: &Catalog,
        curve: &Arc<ExpCurve>,
    ) -> Result<StoredPlayer, sqlx::Error> {
        let player = self.load_player(steamid).await?;
        let mut heroes = Vec::new();
        for row in self.load_hero_rows(steamid).await? {
            let Some(def) = catalog.find_hero(&row.cid) else {
                warn!("Skipping unknown hero '{}' stored for {}", row.cid, steamid);
                continue;
            };
            let mut hero = Hero::restore(def, Arc::clone(curve), row.level, row.exp);
            for (cid, level) in self.load_skill_levels(steamid, &row.cid).await? {
                if !hero.restore_skill(&cid, level) {
                    debug!("Ignoring stored skill '{}' of {} for {}", cid, row.cid, steamid);
                }
            }
            heroes.push(hero);
        }

        let (gold, active_hero) = match player {
            Some(row) => (row.gold, row.hero_cid),
            None => (0, None),
        };
        Ok(StoredPlayer {
            gold,
            active_hero,
            heroes,
        })
    }

    /// Save the player row and every owned hero
    pub async fn save_all(
        &self,
        steamid: &SessionKey,
        gold: u64,
        active_hero: Option<&str>,
        heroes: &[Hero],
    ) -> Result<(), sqlx::Error> {
        self.save_player(steamid, gold, active_hero).await?;
        for hero in heroes {
            self.save_hero(steamid, hero).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herowars_shared::content::{self, TEST_HERO_1};

    async fn memory() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.setup().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_missing_player_loads_empty() {
        let db = memory().await;
        let catalog = content::default_catalog().unwrap();
        let stored = db
            .load_stored(&"STEAM_0:0:1".into(), &catalog, &Arc::new(ExpCurve::default()))
            .await
            .unwrap();
        assert_eq!(stored.gold, 0);
        assert!(stored.active_hero.is_none());
        assert!(stored.heroes.is_empty());
    }

    #[tokio::test]
    async fn test_setup_is_idempotent() {
        let db = memory().await;
        db.setup().await.unwrap();
    }

    #[tokio::test]
    async fn test_hero_roundtrip() {
        let db = memory().await;
        let catalog = content::default_catalog().unwrap();
        let curve = Arc::new(ExpCurve::default());
        let steamid = SessionKey::new("STEAM_0:1:42");

        let mut hero = Hero::new(&TEST_HERO_1, Arc::clone(&curve));
        hero.set_level(4).unwrap();
        hero.set_exp(17).unwrap();
        hero.upgrade_skill("Ignite").unwrap();
        hero.upgrade_skill("Ignite").unwrap();

        db.save_all(&steamid, 30, Some("TestHero1"), std::slice::from_ref(&hero))
            .await
            .unwrap();

        let stored = db.load_stored(&steamid, &catalog, &curve).await.unwrap();
        assert_eq!(stored.gold, 30);
        assert_eq!(stored.active_hero.as_deref(), Some("TestHero1"));
        let loaded = &stored.heroes[0];
        assert_eq!(loaded.level(), 4);
        assert_eq!(loaded.exp(), 17);
        assert_eq!(loaded.skill("Ignite").map(|s| s.level()), Some(2));
        assert_eq!(loaded.skill("Enrage").map(|s| s.level()), Some(0));
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_values() {
        let db = memory().await;
        let steamid = SessionKey::new("STEAM_0:1:7");
        db.save_player(&steamid, 10, None).await.unwrap();
        db.save_player(&steamid, 3, Some("TestHero2")).await.unwrap();
        assert_eq!(
            db.load_player(&steamid).await.unwrap(),
            Some(PlayerRow {
                gold: 3,
                hero_cid: Some("TestHero2".into())
            })
        );
    }

    #[tokio::test]
    async fn test_stored_level_above_max_is_clamped() {
        let db = memory().await;
        let catalog = content::default_catalog().unwrap();
        let steamid = SessionKey::new("STEAM_0:1:8");
        sqlx::query("INSERT INTO heroes (steamid, cid, level, exp) VALUES (?, 'TestHero2', 99, 5)")
            .bind(steamid.as_str())
            .execute(&db.pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO heroes (steamid, cid, level, exp) VALUES (?, 'Retired', 3, 0)")
            .bind(steamid.as_str())
            .execute(&db.pool)
            .await
            .unwrap();

        let stored = db
            .load_stored(&steamid, &catalog, &Arc::new(ExpCurve::default()))
            .await
            .unwrap();
        assert_eq!(stored.heroes.len(), 1);
        assert_eq!(stored.heroes[0].level(), 20);
        assert_eq!(stored.heroes[0].exp(), 0);
    }
}
