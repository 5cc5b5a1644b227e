//! # Tax Service
//!
//! Request-level tax operations over an injected [`ProductSource`].
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CalculateCartTaxRequest { items: [{phoneId, overridePrice?, qty?}] }   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate (cart size, quantities, prices)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  source.find_product(id) per line ──► ProductNotFound / Unavailable     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  calculate_product_tax (per line) + calculate_quantity_cart_tax (totals)│
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CalculateCartTaxResponse { items, subtotal, totalTax, grandTotal,      │
//! │                             taxBreakdown }                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every product is fetched before any arithmetic runs; the arithmetic itself
//! is synchronous and cannot fail.

use tracing::{debug, info};

use crate::error::DbResult;
use crate::source::ProductSource;
use tally_core::dto::{
    CalculateCartTaxRequest, CalculateCartTaxResponse, CalculatePhoneTaxRequest,
    CalculatePhoneTaxResponse, CartTaxRequestItem, PhoneTaxConfig, UpdatePhoneTaxConfig,
};
use tally_core::validation::{
    validate_cart_size, validate_price, validate_quantity, validate_tax_rate,
};
use tally_core::{
    calculate_product_tax, calculate_quantity_cart_tax, CartItem, CoreError, Product,
};

/// Tax operations for the API layer.
///
/// ## Usage
/// ```rust,ignore
/// let service = db.tax_service();
/// let response = service.calculate_cart_tax(&request).await?;
/// ```
#[derive(Debug, Clone)]
pub struct TaxService<P> {
    source: P,
}

impl<P: ProductSource> TaxService<P> {
    pub fn new(source: P) -> Self {
        TaxService { source }
    }

    /// Returns the underlying product source.
    pub fn source(&self) -> &P {
        &self.source
    }

    /// Tax for one phone at its shelf price or an override.
    ///
    /// Quoting a price does not require the phone to be available.
    pub async fn calculate_phone_tax(
        &self,
        request: &CalculatePhoneTaxRequest,
    ) -> DbResult<CalculatePhoneTaxResponse> {
        let quantity = request.quantity();
        validate_quantity(quantity)?;
        if let Some(price) = request.override_price {
            validate_price("overridePrice", price)?;
        }

        let product = self.require_product(&request.phone_id).await?;
        let unit_price = request.override_price.unwrap_or(product.selling_price);
        let calc = calculate_product_tax(&product, quantity, request.override_price);

        debug!(
            phone_id = %product.id,
            quantity,
            total_tax = calc.tax_amount.cents(),
            "Calculated phone tax"
        );

        Ok(CalculatePhoneTaxResponse::from_calculation(&product, unit_price, &calc))
    }

    /// Tax for a cart of phones, honouring each line's quantity.
    ///
    /// Every phone must exist and be available for sale.
    pub async fn calculate_cart_tax(
        &self,
        request: &CalculateCartTaxRequest,
    ) -> DbResult<CalculateCartTaxResponse> {
        let products = self.load_cart(&request.items).await?;

        let mut lines = Vec::with_capacity(products.len());
        let mut items = Vec::with_capacity(products.len());

        for (item, product) in request.items.iter().zip(&products) {
            let quantity = item.quantity();
            let unit_price = item.override_price.unwrap_or(product.selling_price);
            let calc = calculate_product_tax(product, quantity, item.override_price);

            lines.push(product.tax_config().line(unit_price).with_quantity(quantity));
            items.push(CalculatePhoneTaxResponse::from_calculation(
                product, unit_price, &calc,
            ));
        }

        let summary = calculate_quantity_cart_tax(&lines);

        info!(
            lines = items.len(),
            subtotal = summary.subtotal.cents(),
            total_tax = summary.total_tax.cents(),
            rates = summary.tax_breakdown.len(),
            "Calculated cart tax"
        );

        Ok(CalculateCartTaxResponse::new(items, summary))
    }

    /// Snapshots the requested phones into cart items, ready for a receipt.
    ///
    /// Phones are single units, so line quantities are not carried over.
    pub async fn build_cart(&self, request: &CalculateCartTaxRequest) -> DbResult<Vec<CartItem>> {
        let products = self.load_cart(&request.items).await?;

        Ok(request
            .items
            .iter()
            .zip(&products)
            .map(|(item, product)| CartItem::from_product(product, item.override_price))
            .collect())
    }

    /// A phone's current tax configuration.
    pub async fn get_tax_config(&self, phone_id: &str) -> DbResult<PhoneTaxConfig> {
        Ok(self.require_product(phone_id).await?.tax_config())
    }

    /// Applies a partial update to a phone's tax configuration.
    pub async fn update_tax_config(
        &self,
        phone_id: &str,
        update: &UpdatePhoneTaxConfig,
    ) -> DbResult<PhoneTaxConfig> {
        if let Some(rate) = update.tax_rate {
            validate_tax_rate(rate)?;
        }

        self.source
            .update_tax_config(phone_id, update)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(phone_id.to_string()).into())
    }

    async fn require_product(&self, phone_id: &str) -> DbResult<Product> {
        self.source
            .find_product(phone_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(phone_id.to_string()).into())
    }

    /// Validates every line, then fetches and checks every phone.
    async fn load_cart(&self, items: &[CartTaxRequestItem]) -> DbResult<Vec<Product>> {
        validate_cart_size(items.len())?;
        for item in items {
            validate_quantity(item.quantity())?;
            if let Some(price) = item.override_price {
                validate_price("overridePrice", price)?;
            }
        }

        let mut products = Vec::with_capacity(items.len());
        for item in items {
            let product = self.require_product(&item.phone_id).await?;
            if !product.can_sell() {
                return Err(CoreError::ProductUnavailable {
                    id: product.id.clone(),
                    status: product.status.to_string(),
                }
                .into());
            }
            products.push(product);
        }

        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::source::InMemoryProducts;
    use chrono::Utc;
    use tally_core::{Money, ProductCondition, ProductStatus, TaxRate};

    fn phone(id: &str, price: i64, bps: u32, inclusive: bool, exempt: bool) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            brand_name: "Apple".to_string(),
            model: format!("iPhone {}", id),
            storage_gb: Some(128),
            color: None,
            condition: ProductCondition::New,
            imei: None,
            cost_price: Money::from_cents(price / 2),
            selling_price: Money::from_cents(price),
            tax_rate: TaxRate::from_bps(bps),
            is_tax_inclusive: inclusive,
            is_tax_exempt: exempt,
            status: ProductStatus::Available,
            created_at: now,
            updated_at: now,
        }
    }

    fn service() -> TaxService<InMemoryProducts> {
        TaxService::new(InMemoryProducts::with_products([
            phone("15", 120_000, 1000, false, false),
            phone("14", 100_000, 1000, false, false),
            phone("se", 10_000, 1000, true, false),
            phone("12", 30_000, 1000, false, true),
        ]))
    }

    fn line(id: &str) -> CartTaxRequestItem {
        CartTaxRequestItem {
            phone_id: id.to_string(),
            override_price: None,
            quantity: None,
        }
    }

    #[tokio::test]
    async fn test_phone_tax_inclusive() {
        let response = service()
            .calculate_phone_tax(&CalculatePhoneTaxRequest {
                phone_id: "se".to_string(),
                override_price: None,
                quantity: None,
            })
            .await
            .unwrap();

        assert_eq!(response.unit_price, Money::from_cents(10_000));
        assert_eq!(response.unit_base_price, Money::from_cents(9_091));
        assert_eq!(response.unit_tax_amount, Money::from_cents(909));
        assert_eq!(response.total_price, Money::from_cents(10_000));
        assert_eq!(response.quantity, 1);
        assert!(response.is_tax_inclusive);
    }

    #[tokio::test]
    async fn test_phone_tax_override_and_quantity() {
        let response = service()
            .calculate_phone_tax(&CalculatePhoneTaxRequest {
                phone_id: "15".to_string(),
                override_price: Some(Money::from_cents(110_000)),
                quantity: Some(2),
            })
            .await
            .unwrap();

        assert_eq!(response.unit_price, Money::from_cents(110_000));
        assert_eq!(response.total_base_price, Money::from_cents(220_000));
        assert_eq!(response.total_tax_amount, Money::from_cents(22_000));
        assert_eq!(response.total_price, Money::from_cents(242_000));
    }

    #[tokio::test]
    async fn test_phone_tax_exempt_reports_zero_rate() {
        let response = service()
            .calculate_phone_tax(&CalculatePhoneTaxRequest {
                phone_id: "12".to_string(),
                override_price: None,
                quantity: None,
            })
            .await
            .unwrap();

        assert!(response.is_tax_exempt);
        assert!(response.tax_rate.is_zero());
        assert!(response.total_tax_amount.is_zero());
        assert_eq!(response.total_price, Money::from_cents(30_000));
    }

    #[tokio::test]
    async fn test_phone_tax_not_found() {
        let err = service()
            .calculate_phone_tax(&CalculatePhoneTaxRequest {
                phone_id: "missing".to_string(),
                override_price: None,
                quantity: None,
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_phone_tax_rejects_bad_quantity() {
        let err = service()
            .calculate_phone_tax(&CalculatePhoneTaxRequest {
                phone_id: "15".to_string(),
                override_price: None,
                quantity: Some(0),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_cart_tax() {
        let response = service()
            .calculate_cart_tax(&CalculateCartTaxRequest {
                items: vec![line("15"), line("14"), line("12")],
            })
            .await
            .unwrap();

        assert_eq!(response.items.len(), 3);
        assert_eq!(response.subtotal, Money::from_cents(250_000));
        assert_eq!(response.total_tax, Money::from_cents(22_000));
        assert_eq!(response.grand_total, Money::from_cents(272_000));

        assert_eq!(response.tax_breakdown.len(), 2);
        assert!(response.tax_breakdown[0].tax_rate.is_zero());
        assert_eq!(response.tax_breakdown[1].taxable_amount, Money::from_cents(220_000));
        assert_eq!(response.tax_breakdown[1].item_count, 2);
    }

    #[tokio::test]
    async fn test_cart_tax_counts_units() {
        let mut first = line("15");
        first.quantity = Some(3);

        let response = service()
            .calculate_cart_tax(&CalculateCartTaxRequest { items: vec![first] })
            .await
            .unwrap();

        assert_eq!(response.subtotal, Money::from_cents(360_000));
        assert_eq!(response.tax_breakdown[0].item_count, 3);
    }

    #[tokio::test]
    async fn test_cart_rejects_sold_phone() {
        let service = service();
        let mut sold = phone("11", 20_000, 1000, false, false);
        sold.status = ProductStatus::Sold;
        service.source().insert(sold).await;

        let err = service
            .calculate_cart_tax(&CalculateCartTaxRequest {
                items: vec![line("15"), line("11")],
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::ProductUnavailable { ref status, .. }) if status == "sold"
        ));
    }

    #[tokio::test]
    async fn test_cart_rejects_oversized_request() {
        let items = (0..=tally_core::MAX_CART_ITEMS).map(|_| line("15")).collect();
        let err = service()
            .calculate_cart_tax(&CalculateCartTaxRequest { items })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::CartTooLarge { .. })));
    }

    #[tokio::test]
    async fn test_build_cart() {
        let mut negotiated = line("14");
        negotiated.override_price = Some(Money::from_cents(95_000));

        let cart = service()
            .build_cart(&CalculateCartTaxRequest {
                items: vec![line("15"), negotiated],
            })
            .await
            .unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart[1].sale_price, Money::from_cents(95_000));
        assert_eq!(cart[1].selling_price, Money::from_cents(100_000));
        assert_eq!(cart[1].tax_amount, Money::from_cents(9_500));
    }

    #[tokio::test]
    async fn test_tax_config_round_trip() {
        let service = service();

        let config = service.get_tax_config("15").await.unwrap();
        assert_eq!(config.tax_rate, TaxRate::from_bps(1000));

        let updated = service
            .update_tax_config(
                "15",
                &UpdatePhoneTaxConfig {
                    tax_rate: Some(TaxRate::from_bps(750)),
                    is_tax_inclusive: Some(true),
                    is_tax_exempt: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.tax_rate, TaxRate::from_bps(750));
        assert!(updated.is_tax_inclusive);
        assert_eq!(service.get_tax_config("15").await.unwrap(), updated);

        let err = service
            .update_tax_config("missing", &UpdatePhoneTaxConfig::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = service
            .update_tax_config(
                "15",
                &UpdatePhoneTaxConfig {
                    tax_rate: Some(TaxRate::from_bps(20_000)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
    }
}
