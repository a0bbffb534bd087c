use crate::application::stats::{self, RevenueRange, RevenueSeries, StatsSnapshot};
use crate::domain::event::OrderEvent;
use crate::domain::options::OrderOptions;
use crate::domain::order::{
    Order, OrderId, OrderStatus, PendingOrder, TokenPrefix, TransitionPolicy, UploadedFile,
};
use crate::domain::payment::{
    Checkout, CheckoutContext, DUMMY_ORDER_PREFIX, PaymentConfirmation, PaymentMode,
    PaymentRequest,
};
use crate::domain::ports::{
    EventPublisher, OrderStoreBox, PaymentVerifierBox, RateCardStoreBox, UploadStoreBox,
};
use crate::domain::pricing::compute_price;
use crate::domain::rate_card::RateCard;
use crate::error::{Result, ShopError};
use chrono::{Local, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

/// The order core of the shop.
///
/// `PrintShop` prices customer options, turns confirmed payments into orders,
/// moves orders through fulfillment and answers dashboard queries. It owns
/// handles to its collaborators and publishes every lifecycle change to the
/// configured [`EventPublisher`].
pub struct PrintShop {
    orders: OrderStoreBox,
    rates: RateCardStoreBox,
    uploads: UploadStoreBox,
    verifier: PaymentVerifierBox,
    events: Arc<dyn EventPublisher>,
    policy: TransitionPolicy,
}

impl PrintShop {
    /// Creates a new `PrintShop` with the lenient transition policy.
    ///
    /// # Arguments
    ///
    /// * `orders` - The store for paid orders.
    /// * `rates` - The store holding the current rate card.
    /// * `uploads` - File storage used to release abandoned uploads.
    /// * `verifier` - Payment confirmation check (dummy or signature based).
    /// * `events` - Where lifecycle events are published.
    pub fn new(
        orders: OrderStoreBox,
        rates: RateCardStoreBox,
        uploads: UploadStoreBox,
        verifier: PaymentVerifierBox,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            orders,
            rates,
            uploads,
            verifier,
            events,
            policy: TransitionPolicy::default(),
        }
    }

    pub fn with_transition_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether confirmations are checked against a gateway secret.
    pub fn payment_mode(&self) -> PaymentMode {
        self.verifier.mode()
    }

    pub async fn rate_card(&self) -> Result<RateCard> {
        self.rates.load().await
    }

    /// Replaces the whole rate card. Existing orders keep their price.
    pub async fn replace_rate_card(&self, card: RateCard) -> Result<RateCard> {
        self.rates.replace(card.clone()).await?;
        info!("Rate card replaced");
        Ok(card)
    }

    /// Prices options against the current rate card.
    pub async fn quote(&self, options: &OrderOptions) -> Result<Decimal> {
        let rates = self.rates.load().await?;
        Ok(compute_price(options, &rates))
    }

    /// Prices an upload and prepares the pending order for payment.
    ///
    /// A non-positive amount aborts checkout and releases the upload.
    pub async fn checkout(
        &self,
        options: OrderOptions,
        file: UploadedFile,
        phone: impl Into<String>,
    ) -> Result<Checkout> {
        let amount = match self.quote(&options).await {
            Ok(amount) => amount,
            Err(e) => {
                self.release(&file).await;
                return Err(e);
            }
        };
        if amount <= Decimal::ZERO {
            self.release(&file).await;
            return Err(ShopError::InvalidAmount(amount));
        }

        let mode = self.verifier.mode();
        let order_id = match mode {
            PaymentMode::Dummy => Some(format!(
                "{DUMMY_ORDER_PREFIX}{}",
                Utc::now().timestamp_millis()
            )),
            PaymentMode::Live => None,
        };
        info!(file = %file.file_name, %amount, ?mode, "Checkout prepared");

        Ok(Checkout {
            request: PaymentRequest {
                order_id,
                amount: PaymentRequest::minor_units(amount),
                mode,
            },
            context: CheckoutContext {
                options,
                file,
                final_amount: amount,
                phone: phone.into(),
            },
        })
    }

    /// Turns a gateway confirmation into an order.
    ///
    /// `context` is the pending order saved at checkout; without it the
    /// session is considered expired. A rejected payment releases the upload.
    pub async fn confirm_payment(
        &self,
        confirmation: &PaymentConfirmation,
        context: Option<CheckoutContext>,
    ) -> Result<Order> {
        let Some(context) = context else {
            warn!(order = %confirmation.gateway_order_id, "Payment confirmed without a pending order");
            return Err(ShopError::SessionExpired);
        };

        if !self.verifier.verify(confirmation) {
            warn!(order = %confirmation.gateway_order_id, "Payment verification failed");
            self.release(&context.file).await;
            return Err(ShopError::PaymentVerification(
                confirmation.gateway_order_id.clone(),
            ));
        }

        self.create_order(context).await
    }

    async fn create_order(&self, context: CheckoutContext) -> Result<Order> {
        let pending = PendingOrder {
            prefix: TokenPrefix::for_options(&context.options),
            timestamp: Utc::now(),
            details: context.options.to_string(),
            phone: context.phone,
            file: context.file,
            price: context.final_amount,
        };

        let order = self.orders.create(pending).await?;
        info!(token = %order.token_id, price = %order.price, "Order created");

        self.events.publish(OrderEvent::NewOrder(order.clone()));
        Ok(order)
    }

    /// Moves an order to `status`, as requested from the admin dashboard.
    ///
    /// The transition policy is checked by the store against the status it
    /// holds at the moment of the write.
    pub async fn advance(&self, id: &OrderId, status: &str) -> Result<Order> {
        let status: OrderStatus = status.parse()?;

        let order = self
            .orders
            .set_status(id, status, self.policy)
            .await?
            .ok_or_else(|| ShopError::NotFound(id.to_string()))?;
        info!(token = %order.token_id, to = %order.status, "Order status changed");

        self.events.publish(OrderEvent::StatusUpdate(order.clone()));
        Ok(order)
    }

    /// All orders, newest first.
    pub async fn orders(&self) -> Result<Vec<Order>> {
        let mut orders = self.orders.get_all().await?;
        orders.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
        Ok(orders)
    }

    pub async fn stats(&self) -> Result<StatsSnapshot> {
        let orders = self.orders.get_all().await?;
        Ok(stats::daily_stats(&orders, &Local::now()))
    }

    pub async fn revenue_series(&self, range: RevenueRange) -> Result<RevenueSeries> {
        let orders = self.orders.get_all().await?;
        Ok(stats::revenue_series(&orders, range, &Local::now()))
    }

    /// Same as [`Self::revenue_series`], with unknown keys read as `month-by-week`.
    pub async fn revenue_series_for_key(&self, key: &str) -> Result<RevenueSeries> {
        self.revenue_series(RevenueRange::from_key(key)).await
    }

    async fn release(&self, file: &UploadedFile) {
        if let Err(e) = self.uploads.release(file).await {
            warn!(path = %file.file_path, error = %e, "Failed to release upload");
        }
    }
}
