//! Registry of the hero and item definitions available to players.

use crate::heroes::HeroDef;
use crate::items::ItemDef;
use crate::skills::SkillDef;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("hero '{0}' is registered twice")]
    DuplicateHero(String),
    #[error("item '{0}' is registered twice")]
    DuplicateItem(String),
    #[error("hero '{hero}' declares skill '{skill}' twice")]
    DuplicateSkill { hero: String, skill: String },
}

/// Immutable, cid-sorted set of definitions
#[derive(Debug, Default)]
pub struct Catalog {
    heroes: Vec<&'static HeroDef>,
    items: Vec<&'static ItemDef>,
}

#[derive(Debug, Default)]
pub struct CatalogBuilder {
    heroes: Vec<&'static HeroDef>,
    items: Vec<&'static ItemDef>,
}

impl CatalogBuilder {
    pub fn hero(mut self, def: &'static HeroDef) -> Self {
        self.heroes.push(def);
        self
    }

    pub fn item(mut self, def: &'static ItemDef) -> Self {
        self.items.push(def);
        self
    }

    pub fn build(mut self) -> Result<Catalog, CatalogError> {
        self.heroes.sort_by_key(|def| def.cid);
        self.items.sort_by_key(|def| def.cid);

        if let Some(pair) = self.heroes.windows(2).find(|w| w[0].cid == w[1].cid) {
            return Err(CatalogError::DuplicateHero(pair[0].cid.to_string()));
        }
        if let Some(pair) = self.items.windows(2).find(|w| w[0].cid == w[1].cid) {
            return Err(CatalogError::DuplicateItem(pair[0].cid.to_string()));
        }
        for hero in &self.heroes {
            let mut seen = HashSet::new();
            for skill in hero.skills.iter().chain(hero.passives) {
                if !seen.insert(skill.cid) {
                    return Err(CatalogError::DuplicateSkill {
                        hero: hero.cid.to_string(),
                        skill: skill.cid.to_string(),
                    });
                }
            }
        }

        Ok(Catalog {
            heroes: self.heroes,
            items: self.items,
        })
    }
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    pub fn heroes(&self) -> &[&'static HeroDef] {
        &self.heroes
    }

    pub fn items(&self) -> &[&'static ItemDef] {
        &self.items
    }

    /// Every skill and passive across all heroes, sorted by cid
    pub fn skills(&self) -> Vec<&'static SkillDef> {
        let mut skills: Vec<&'static SkillDef> = self
            .heroes
            .iter()
            .flat_map(|hero| hero.skills.iter().chain(hero.passives).copied())
            .collect();
        skills.sort_by_key(|def| def.cid);
        skills.dedup_by_key(|def| def.cid);
        skills
    }

    pub fn find_hero(&self, cid: &str) -> Option<&'static HeroDef> {
        self.heroes
            .binary_search_by_key(&cid, |def| def.cid)
            .ok()
            .map(|index| self.heroes[index])
    }

    pub fn find_item(&self, cid: &str) -> Option<&'static ItemDef> {
        self.items
            .binary_search_by_key(&cid, |def| def.cid)
            .ok()
            .map(|index| self.items[index])
    }

    /// Distinct item categories, sorted
    pub fn item_categories(&self, default: &str) -> Vec<String> {
        let mut categories: Vec<String> = self
            .items
            .iter()
            .map(|def| def.category_or(default).to_string())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty()
    }
}
