//! Menu views sent to the host and the choices players make in them.
//!
//! Views are plain snapshots; the host renders them however it likes and
//! reports the picked option back as a [`MenuChoice`].

use crate::config::Config;
use crate::entities::Player;
use crate::registry::PlayerRegistry;
use herowars_shared::{Catalog, Entity, HeroListing, HeroSnapshot, ItemSnapshot, SessionKey};
use serde::{Deserialize, Serialize};

/// Which menu to open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "menu", rename_all = "snake_case")]
pub enum MenuKind {
    Main,
    BuyHeroes,
    OwnedHeroes,
    CurrentHero,
    ItemCategories,
    BuyItems { category: String },
    SellItems,
    Admin,
}

/// Attribute an admin can grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAttribute {
    Level,
    Exp,
    Gold,
}

impl AdminAttribute {
    pub fn name(self) -> &'static str {
        match self {
            AdminAttribute::Level => "level",
            AdminAttribute::Exp => "exp",
            AdminAttribute::Gold => "gold",
        }
    }
}

/// Option selected by a player in a menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "choice", rename_all = "snake_case")]
pub enum MenuChoice {
    Open { menu: MenuKind },
    BuyHero { cid: String },
    ChangeHero { cid: String },
    UpgradeSkill { cid: String },
    ResetSkills,
    BuyItem { cid: String },
    SellItem { slot: usize },
    AdminGive {
        target: SessionKey,
        attribute: AdminAttribute,
        amount: i64,
    },
}

/// An owned item together with the slot used to sell it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSlot {
    pub slot: usize,
    pub item: ItemSnapshot,
}

/// Summary of a connected player for the admin menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminEntry {
    pub steamid: SessionKey,
    pub gold: u64,
    pub hero: Option<&'static str>,
    pub level: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "menu", rename_all = "snake_case")]
pub enum MenuView {
    Main {
        gold: u64,
        cash: u64,
        hero: Option<HeroSnapshot>,
    },
    BuyHeroes {
        gold: u64,
        heroes: Vec<HeroListing>,
    },
    OwnedHeroes {
        active: Option<&'static str>,
        heroes: Vec<HeroSnapshot>,
    },
    CurrentHero {
        hero: HeroSnapshot,
    },
    ItemCategories {
        categories: Vec<String>,
    },
    BuyItems {
        category: String,
        cash: u64,
        items: Vec<ItemSnapshot>,
    },
    SellItems {
        cash: u64,
        items: Vec<ItemSlot>,
    },
    Admin {
        players: Vec<AdminEntry>,
    },
}

pub fn main_menu(player: &Player) -> MenuView {
    MenuView::Main {
        gold: player.gold(),
        cash: player.cash(),
        hero: player.hero().map(|hero| hero.snapshot()),
    }
}

/// Heroes the player does not own yet
pub fn buy_heroes(catalog: &Catalog, player: &Player, config: &Config) -> MenuView {
    let heroes = catalog
        .heroes()
        .iter()
        .filter(|def| !player.owns(def.cid))
        .map(|def| def.listing(&config.default_hero_category))
        .collect();
    MenuView::BuyHeroes {
        gold: player.gold(),
        heroes,
    }
}

pub fn owned_heroes(player: &Player) -> MenuView {
    MenuView::OwnedHeroes {
        active: player.active_cid(),
        heroes: player.heroes().iter().map(|hero| hero.snapshot()).collect(),
    }
}

pub fn current_hero(player: &Player) -> Option<MenuView> {
    player
        .hero()
        .map(|hero| MenuView::CurrentHero { hero: hero.snapshot() })
}

pub fn item_categories(catalog: &Catalog, config: &Config) -> MenuView {
    MenuView::ItemCategories {
        categories: catalog.item_categories(&config.default_item_category),
    }
}

pub fn buy_items(catalog: &Catalog, player: &Player, config: &Config, category: &str) -> MenuView {
    let items = catalog
        .items()
        .iter()
        .filter(|def| def.category_or(&config.default_item_category) == category)
        .map(|def| def.snapshot(config.item_sell_value_multiplier, &config.default_item_category))
        .collect();
    MenuView::BuyItems {
        category: category.to_string(),
        cash: player.cash(),
        items,
    }
}

pub fn sell_items(player: &Player, config: &Config) -> MenuView {
    let items: Vec<ItemSlot> = player
        .hero()
        .map(|hero| {
            hero.items()
                .iter()
                .enumerate()
                .map(|(slot, item)| ItemSlot {
                    slot,
                    item: item
                        .def()
                        .snapshot(config.item_sell_value_multiplier, &config.default_item_category),
                })
                .collect()
        })
        .unwrap_or_default();
    MenuView::SellItems {
        cash: player.cash(),
        items,
    }
}

pub fn admin(registry: &PlayerRegistry) -> MenuView {
    let mut players: Vec<AdminEntry> = registry
        .iter()
        .map(|player| AdminEntry {
            steamid: player.steamid().clone(),
            gold: player.gold(),
            hero: player.active_cid(),
            level: player.hero().map(|hero| hero.level()),
        })
        .collect();
    players.sort_by(|a, b| a.steamid.cmp(&b.steamid));
    MenuView::Admin { players }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herowars_shared::content::{self, TEST_HERO_1};
    use herowars_shared::{ExpCurve, Hero};
    use std::sync::Arc;

    fn player() -> Player {
        let mut player = Player::new("p".into());
        player
            .add_hero(Hero::new(&TEST_HERO_1, Arc::new(ExpCurve::default())))
            .unwrap();
        player.switch_hero("TestHero1").unwrap();
        player
    }

    #[test]
    fn test_buy_heroes_hides_owned() {
        let catalog = content::default_catalog().unwrap();
        let MenuView::BuyHeroes { heroes, .. } = buy_heroes(&catalog, &player(), &Config::default())
        else {
            panic!("wrong menu");
        };
        let cids: Vec<&str> = heroes.iter().map(|h| h.cid).collect();
        assert_eq!(cids, vec!["TestHero2"]);
        assert_eq!(heroes[0].category, "Test Heroes");
    }

    #[test]
    fn test_buy_items_filters_by_category() {
        let catalog = content::default_catalog().unwrap();
        let MenuView::BuyItems { items, .. } =
            buy_items(&catalog, &player(), &Config::default(), "Others")
        else {
            panic!("wrong menu");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].cid, "LuckyCharm");
        assert_eq!(items[0].sell_value, 20);
    }

    #[test]
    fn test_sell_items_lists_slots() {
        let mut player = player();
        player.give_cash(10);
        player.buy_item(&content::EXP_BOOST).unwrap();
        let MenuView::SellItems { items, cash } = sell_items(&player, &Config::default()) else {
            panic!("wrong menu");
        };
        assert_eq!(cash, 0);
        assert_eq!(items[0].slot, 0);
        assert_eq!(items[0].item.sell_value, 5);
    }

    #[test]
    fn test_choice_json_shape() {
        let choice: MenuChoice =
            serde_json::from_str(r#"{"choice":"open","menu":{"menu":"buy_items","category":"Others"}}"#)
                .unwrap();
        assert_eq!(
            choice,
            MenuChoice::Open {
                menu: MenuKind::BuyItems {
                    category: "Others".into()
                }
            }
        );
        let choice: MenuChoice = serde_json::from_str(
            r#"{"choice":"admin_give","target":"b","attribute":"level","amount":-2}"#,
        )
        .unwrap();
        assert!(matches!(
            choice,
            MenuChoice::AdminGive {
                attribute: AdminAttribute::Level,
                amount: -2,
                ..
            }
        ));
    }

    #[test]
    fn test_current_hero_requires_active() {
        assert!(current_hero(&Player::new("x".into())).is_none());
        assert!(current_hero(&player()).is_some());
    }
}
