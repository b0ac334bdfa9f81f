//! Player-facing message templates and the outbound chat seam.

use herowars_shared::{template, SessionKey};
use std::collections::HashMap;
use std::fmt::Display;

/// Delivers chat text to players
pub trait Messenger {
    fn tell(&mut self, to: &SessionKey, text: &str);
    fn broadcast(&mut self, text: &str);
}

const DEFAULTS: &[(&str, &str)] = &[
    // Experience
    ("exp.kill", "+{exp} exp for a kill."),
    ("exp.headshot", "+{exp} exp for a headshot."),
    ("exp.assist", "+{exp} exp for an assist."),
    ("exp.weapon", "+{exp} exp for a {weapon} kill."),
    ("exp.weapon_knife", "+{exp} exp for a knife kill."),
    ("exp.round_win", "+{exp} exp for winning a round."),
    ("exp.round_lose", "+{exp} exp for losing a round."),
    ("exp.bomb_plant", "+{exp} exp for planting the bomb."),
    ("exp.bomb_plant_team", "+{exp} exp for the bomb being planted."),
    ("exp.bomb_explode", "+{exp} exp for the bomb exploding."),
    ("exp.bomb_explode_team", "+{exp} exp for the bomb exploding."),
    ("exp.bomb_defuse", "+{exp} exp for defusing the bomb."),
    ("exp.bomb_defuse_team", "+{exp} exp for the bomb being defused."),
    ("exp.hostage_pick_up", "+{exp} exp for picking up a hostage."),
    ("exp.hostage_pick_up_team", "+{exp} exp for a hostage being picked up."),
    ("exp.hostage_rescue", "+{exp} exp for rescuing a hostage."),
    ("exp.hostage_rescue_team", "+{exp} exp for a hostage being rescued."),
    // Gold
    ("gold.kill", "+{gold} gold for a kill."),
    ("gold.assist", "+{gold} gold for an assist."),
    ("gold.round_win", "+{gold} gold for winning a round."),
    ("gold.round_lose", "+{gold} gold for losing a round."),
    // Menus
    ("menu.no_items_to_buy", "There are no items to buy."),
    ("menu.no_owned_items", "You don't have any items."),
    ("menu.not_enough_cash", "You don't have enough cash (${cash}/${cost})."),
    ("menu.item_limit", "You can't carry more than {limit} of '{name}'."),
    ("menu.bought_item", "You bought item '{name}' for ${cost}."),
    ("menu.sold_item", "You sold item '{name}' for ${cost}."),
    ("menu.no_heroes_to_buy", "There are no heroes to buy."),
    ("menu.not_enough_gold", "You don't have enough gold ({gold}/{cost})."),
    ("menu.hero_owned", "You already own '{name}'."),
    ("menu.hero_not_owned", "You don't own hero '{name}'."),
    ("menu.bought_hero", "You bought hero '{name}' for {cost} gold."),
    ("menu.changed_hero", "You changed your hero to '{name}'."),
    ("menu.no_active_hero", "You don't have an active hero."),
    ("menu.skill_leveled", "Skill '{name}' is now on level {level}."),
    ("menu.skill_points_reset", "Skill points have been reset."),
    (
        "menu.not_required_level",
        "Hero hasn't reached required level ({current_level}/{required_level}).",
    ),
    (
        "menu.not_enough_skill_points",
        "You don't have enough skill points ({skill_points}/{cost}).",
    ),
    ("menu.skill_maxed_out", "Skill has already been maxed out."),
    ("menu.not_admin", "You are not an admin."),
    ("menu.player_not_found", "Player {steamid} is not on the server."),
    ("menu.admin_gave", "Gave {amount} {attribute} to {steamid}."),
    ("menu.admin_rejected", "Could not give {attribute}: {reason}."),
    // Other
    ("other.hero_status", "{name} - lvl {level} - {exp}/{max_exp} exp"),
    ("other.plugin_loaded", "Hero-Wars loaded."),
    ("other.plugin_unloaded", "Hero-Wars unloaded."),
];

/// Message templates with `{placeholder}` arguments
#[derive(Debug, Clone)]
pub struct Messages {
    templates: HashMap<String, String>,
}

impl Messages {
    /// Built-in templates with `overrides` applied on top
    pub fn new(overrides: &HashMap<String, String>) -> Self {
        let mut templates: HashMap<String, String> = DEFAULTS
            .iter()
            .map(|(key, text)| (key.to_string(), text.to_string()))
            .collect();
        templates.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self { templates }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }

    /// Raw template, or `#key` when it is missing
    pub fn get(&self, key: &str) -> String {
        self.templates
            .get(key)
            .cloned()
            .unwrap_or_else(|| format!("#{}", key))
    }

    pub fn format(&self, key: &str, args: &[(&str, &dyn Display)]) -> String {
        template::fill(&self.get(key), args)
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::new(&HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_defaults() {
        let messages = Messages::default();
        assert_eq!(
            messages.format("menu.not_enough_cash", &[("cash", &5), ("cost", &10)]),
            "You don't have enough cash ($5/$10)."
        );
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let overrides = HashMap::from([("exp.kill".to_string(), "Kill! +{exp}".to_string())]);
        let messages = Messages::new(&overrides);
        assert_eq!(messages.format("exp.kill", &[("exp", &30)]), "Kill! +30");
        assert!(messages.contains("exp.assist"));
    }

    #[test]
    fn test_missing_key_is_visible() {
        assert_eq!(Messages::default().get("nope"), "#nope");
    }
}
