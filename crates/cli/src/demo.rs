//! Demonstration suite: a small shopping cart exercised by the harness
//!
//! This is the code-under-test and suite shipped with the demo binary. It
//! touches every harness surface once: unit and session fixtures with
//! teardown, a call-recording double standing in for a price service, a
//! patchable discount rate, skip/xfail/label marks, and a parametrized
//! pricing table.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use testrig_common::HarnessResult;
use testrig_core::case::{ensure, ensure_eq, Mark, TestCase};
use testrig_core::double::patch::Patchable;
use testrig_core::double::Double;
use testrig_core::fixture::{Fixture, FixtureScope};
use testrig_core::params::Parametrize;
use testrig_core::suite::Suite;

/// A bounded shopping cart, the demo's code under test
pub struct ShoppingCart {
    max_size: usize,
    items: Mutex<Vec<String>>,
}

impl ShoppingCart {
    /// Create an empty cart holding at most `max_size` items
    pub fn new(max_size: usize) -> Self {
        Self { max_size, items: Mutex::new(Vec::new()) }
    }

    /// Add an item; rejects the item once the cart is full
    pub fn add_item(&self, item: &str) -> Result<(), String> {
        let mut items = self.items.lock();
        if items.len() >= self.max_size {
            return Err(format!("cart is full ({} items)", self.max_size));
        }
        items.push(item.to_string());
        Ok(())
    }

    /// Number of items currently in the cart
    pub fn size(&self) -> usize {
        self.items.lock().len()
    }

    /// Snapshot of the items, in insertion order
    pub fn items(&self) -> Vec<String> {
        self.items.lock().clone()
    }

    /// Total price of the cart, asking `lookup` for each item's price
    pub fn total_price(&self, lookup: impl Fn(&str) -> Option<u32>) -> Result<u32, String> {
        let mut total = 0;
        for item in self.items() {
            total += lookup(&item).ok_or_else(|| format!("no price for '{item}'"))?;
        }
        Ok(total)
    }
}

static DISCOUNT_RATE: Lazy<Patchable<u32>> = Lazy::new(|| Patchable::new("discount_rate", 0));

/// Site-wide discount rate in percent, patched by the pricing tests
pub fn discount_rate() -> &'static Patchable<u32> {
    &DISCOUNT_RATE
}

/// Build the demonstration suite
pub fn demo_suite() -> HarnessResult<Suite> {
    let mut suite = Suite::new("shopping-cart");

    suite.register_fixture(Fixture::new("cart", |_ctx| {
        Ok::<_, String>(ShoppingCart::new(5))
    }))?;

    // One price service double for the whole run; pricing cases assert on
    // their own slice of the call log after a reset.
    suite.register_fixture(
        Fixture::new("price_service", |_ctx| {
            Ok::<_, String>(Double::<String, Option<u32>>::computing(
                "price_service",
                |item: &String| match item.as_str() {
                    "water" => Some(1),
                    "milk" => Some(2),
                    "coffee" => Some(3),
                    _ => None,
                },
            ))
        })
        .scope(FixtureScope::Session)
        .teardown::<Double<String, Option<u32>>, _>(|service| {
            tracing::debug!(calls = service.call_count(), "price service retired");
        }),
    )?;

    add_cart_cases(&mut suite);
    add_pricing_cases(&mut suite);
    Ok(suite)
}

fn add_cart_cases(suite: &mut Suite) {
    suite.add(
        "test_cart",
        TestCase::new("test_can_add_item", |ctx| {
            let cart = ctx.fixture::<ShoppingCart>("cart")?;
            cart.add_item("apple").map_err(testrig_core::case::Failure::new)?;
            ensure_eq(&cart.size(), &1)
        })
        .uses(["cart"]),
    );

    suite.add(
        "test_cart",
        TestCase::new("test_added_item_is_listed", |ctx| {
            let cart = ctx.fixture::<ShoppingCart>("cart")?;
            cart.add_item("banana").map_err(testrig_core::case::Failure::new)?;
            ensure(cart.items().contains(&"banana".to_string()), "banana missing from cart")
        })
        .uses(["cart"]),
    );

    suite.add(
        "test_cart",
        TestCase::new("test_overflow_rejected", |ctx| {
            let cart = ctx.fixture::<ShoppingCart>("cart")?;
            for i in 0..5 {
                cart.add_item(&format!("item-{i}")).map_err(testrig_core::case::Failure::new)?;
            }
            ensure(cart.add_item("one-too-many").is_err(), "sixth item should be rejected")?;
            ensure_eq(&cart.size(), &5)
        })
        .uses(["cart"])
        .mark(Mark::label("slow")),
    );

    suite.add(
        "test_cart",
        TestCase::new("test_remove_item", |_ctx| ensure(false, "removal not implemented"))
            .mark(Mark::xfail("removal lands with the returns feature")),
    );

    suite.add(
        "test_cart",
        TestCase::new("test_checkout", |_ctx| Ok(()))
            .mark(Mark::skip_because("checkout service is not modeled in the demo")),
    );
}

fn add_pricing_cases(suite: &mut Suite) {
    suite.add(
        "test_pricing",
        TestCase::new("test_total_price_via_service", |ctx| {
            let cart = ctx.fixture::<ShoppingCart>("cart")?;
            let service = ctx.fixture::<Double<String, Option<u32>>>("price_service")?;
            service.reset();

            cart.add_item("coffee").map_err(testrig_core::case::Failure::new)?;
            cart.add_item("water").map_err(testrig_core::case::Failure::new)?;

            let total = cart
                .total_price(|item| service.call(item.to_string()))
                .map_err(testrig_core::case::Failure::new)?;
            ensure_eq(&total, &4)?;
            service.verify_call_count(2)?;
            ensure(service.was_called_with(&"coffee".to_string()), "coffee was never priced")
        })
        .uses(["cart", "price_service"]),
    );

    suite.add(
        "test_pricing",
        TestCase::new("test_unknown_item_has_no_price", |ctx| {
            let cart = ctx.fixture::<ShoppingCart>("cart")?;
            let service = ctx.fixture::<Double<String, Option<u32>>>("price_service")?;
            cart.add_item("caviar").map_err(testrig_core::case::Failure::new)?;

            let result = cart.total_price(|item| service.call(item.to_string()));
            ensure(result.is_err(), "unpriced item should fail the total")
        })
        .uses(["cart", "price_service"]),
    );

    suite.add(
        "test_pricing",
        TestCase::new("test_discount_applies", |ctx| {
            let cart = ctx.fixture::<ShoppingCart>("cart")?;
            cart.add_item("coffee").map_err(testrig_core::case::Failure::new)?;
            cart.add_item("coffee").map_err(testrig_core::case::Failure::new)?;

            let _sale = discount_rate().patch(50);
            let total = cart
                .total_price(|_| Some(3))
                .map(|t| t * (100 - *discount_rate().get()) / 100)
                .map_err(testrig_core::case::Failure::new)?;
            ensure_eq(&total, &3)
        })
        .uses(["cart"]),
    );

    let rows = Parametrize::new("test_item_price")
        .uses(["price_service"])
        .case("water", serde_json::json!(["water", 1]))
        .case("milk", serde_json::json!(["milk", 2]))
        .case("coffee", serde_json::json!(["coffee", 3]))
        .build(|ctx| {
            let (item, expected): (String, u32) = ctx.param()?;
            let service = ctx.fixture::<Double<String, Option<u32>>>("price_service")?;
            ensure_eq(&service.call(item), &Some(expected))
        });
    suite.add_all("test_pricing", rows);
}

#[cfg(test)]
mod tests {
    //! Unit tests for the demo's code under test.
    use super::*;

    /// Validates cart capacity enforcement.
    ///
    /// Assertions:
    /// - Confirms the sixth item is rejected and the size stays at five.
    #[test]
    fn test_cart_capacity() {
        let cart = ShoppingCart::new(5);
        for i in 0..5 {
            cart.add_item(&format!("item-{i}")).unwrap();
        }
        assert!(cart.add_item("overflow").is_err());
        assert_eq!(cart.size(), 5);
    }

    /// Validates totals and the unpriced-item error.
    #[test]
    fn test_total_price() {
        let cart = ShoppingCart::new(5);
        cart.add_item("water").unwrap();
        cart.add_item("coffee").unwrap();

        let lookup = |item: &str| match item {
            "water" => Some(1),
            "coffee" => Some(3),
            _ => None,
        };
        assert_eq!(cart.total_price(lookup), Ok(4));

        cart.add_item("caviar").unwrap();
        assert!(cart.total_price(lookup).is_err());
    }

    /// Validates the demo suite is green end to end.
    ///
    /// Assertions:
    /// - Confirms no failures, errors, or stale xfail marks, so the shipped
    ///   demo never alarms a first-time user.
    #[test]
    fn test_demo_suite_is_green() {
        let suite = demo_suite().unwrap();
        let report = testrig_core::Runner::run(&suite, &testrig_core::RunConfig::default());
        assert!(report.success(), "{:?}", report.problems());
        assert_eq!(report.counts.xfailed, 1);
        assert_eq!(report.counts.skipped, 1);
        assert!(report.counts.passed >= 7);
    }
}
