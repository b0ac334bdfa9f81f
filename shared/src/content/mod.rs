//! Heroes and items shipped with the game.

mod heroes;
mod items;

pub use heroes::{TEST_HERO_1, TEST_HERO_2};
pub use items::{EXP_BOOST, LONGJUMP_BOOTS, LUCKY_CHARM};

use crate::catalog::{Catalog, CatalogError};

/// Catalog of every bundled definition
pub fn default_catalog() -> Result<Catalog, CatalogError> {
    Catalog::builder()
        .hero(&TEST_HERO_1)
        .hero(&TEST_HERO_2)
        .item(&EXP_BOOST)
        .item(&LONGJUMP_BOOTS)
        .item(&LUCKY_CHARM)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_builds() {
        let catalog = default_catalog().unwrap();
        assert_eq!(catalog.heroes().len(), 2);
        assert_eq!(catalog.items().len(), 3);
        assert!(catalog.find_hero("TestHero1").is_some());
        assert_eq!(
            catalog.item_categories("Others"),
            vec!["Others", "Test Items"]
        );
    }
}
