use std::fmt::Display;

use log::info;
use miette::Diagnostic;

use crate::ledger::PlayerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Rod,
    Lure,
}

impl Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Rod => f.write_str("🎣 rod"),
            ItemKind::Lure => f.write_str("🐛 lure"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopItem {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    pub price: u64,
}

#[derive(Debug, thiserror::Error, Diagnostic, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("there is no item called {0:?}")]
    #[diagnostic(code(shop::unknown_item))]
    UnknownItem(String),

    #[error("{item} costs {price} gold but you only have {gold}")]
    #[diagnostic(code(shop::insufficient_gold))]
    InsufficientGold { item: String, price: u64, gold: u64 },
}

#[derive(Debug, Clone)]
pub struct Shop {
    items: Vec<ShopItem>,
}

impl Default for Shop {
    fn default() -> Self {
        Self::new(vec![
            ShopItem {
                id: "beginner-rod".to_string(),
                name: "Beginner Rod".to_string(),
                kind: ItemKind::Rod,
                price: 50,
            },
            ShopItem {
                id: "basic-lure".to_string(),
                name: "Basic Lure".to_string(),
                kind: ItemKind::Lure,
                price: 20,
            },
        ])
    }
}

impl Shop {
    pub fn new(items: Vec<ShopItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ShopItem] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&ShopItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Whether `player` could pay for `item` right now.
    pub fn affordable(&self, item: &ShopItem, player: &PlayerState) -> bool {
        player.gold() >= item.price
    }

    /// Debits the item's price and adds it to the inventory. On rejection the
    /// player is left untouched.
    pub fn purchase<'a>(
        &'a self,
        player: &mut PlayerState,
        id: &str,
    ) -> Result<&'a ShopItem, PurchaseError> {
        let item = self
            .item(id)
            .ok_or_else(|| PurchaseError::UnknownItem(id.to_string()))?;

        if !player.spend_gold(item.price) {
            return Err(PurchaseError::InsufficientGold {
                item: item.name.clone(),
                price: item.price,
                gold: player.gold(),
            });
        }

        player.add_item(item.id.clone());
        info!("Bought {} for {} gold", item.name, item.price);

        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_debits_price() {
        let shop = Shop::default();
        let mut player = PlayerState::new(100);

        let item = shop.purchase(&mut player, "beginner-rod").unwrap();

        assert_eq!(item.price, 50);
        assert_eq!(player.gold(), 50);
        assert_eq!(player.inventory(), ["beginner-rod"]);
    }

    #[test]
    fn purchase_with_exact_gold() {
        let shop = Shop::default();
        let mut player = PlayerState::new(20);

        assert!(shop.purchase(&mut player, "basic-lure").is_ok());
        assert_eq!(player.gold(), 0);
    }

    #[test]
    fn insufficient_gold_leaves_player_untouched() {
        let shop = Shop::default();
        let mut player = PlayerState::new(49);
        let before = player.clone();

        let err = shop.purchase(&mut player, "beginner-rod").unwrap_err();

        assert_eq!(
            err,
            PurchaseError::InsufficientGold {
                item: "Beginner Rod".to_string(),
                price: 50,
                gold: 49
            }
        );
        assert_eq!(player, before);
    }

    #[test]
    fn unknown_item_is_rejected() {
        let shop = Shop::default();
        let mut player = PlayerState::new(1000);

        let err = shop.purchase(&mut player, "golden-rod").unwrap_err();

        assert_eq!(err, PurchaseError::UnknownItem("golden-rod".to_string()));
        assert_eq!(player.gold(), 1000);
    }

    #[test]
    fn affordability() {
        let shop = Shop::default();
        let player = PlayerState::new(30);

        let rod = shop.item("beginner-rod").unwrap();
        let lure = shop.item("basic-lure").unwrap();

        assert!(!shop.affordable(rod, &player));
        assert!(shop.affordable(lure, &player));
    }
}
