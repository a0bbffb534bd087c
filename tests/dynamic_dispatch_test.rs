use chrono::Utc;
use printdesk::application::shop::PrintShop;
use printdesk::domain::event::OrderEvent;
use printdesk::domain::options::{Count, DocumentOptions, OrderOptions, PrintType};
use printdesk::domain::order::{
    Order, OrderId, OrderStatus, Token, TokenPrefix, TransitionPolicy, UploadedFile,
};
use printdesk::domain::payment::PaymentConfirmation;
use printdesk::domain::ports::{EventPublisher, OrderStoreBox, RateCardStoreBox};
use printdesk::infrastructure::broadcast::Broadcaster;
use printdesk::infrastructure::in_memory::{InMemoryOrderStore, InMemoryRateCardStore};
use printdesk::infrastructure::payment::DummyVerifier;
use printdesk::infrastructure::uploads::LocalUploads;
use rust_decimal_macros::dec;
use std::sync::Arc;

#[tokio::test]
async fn test_stores_as_trait_objects() {
    let order_store: OrderStoreBox = Box::new(InMemoryOrderStore::new());
    let rate_store: RateCardStoreBox = Box::new(InMemoryRateCardStore::new());

    let order = Order {
        id: OrderId::from("1"),
        token_id: Token::new(TokenPrefix::Color, 101),
        timestamp: Utc::now(),
        details: "1 pages, COLOR, Single-Sided (1 copy)".to_string(),
        phone: "9876543210".to_string(),
        file: UploadedFile::new("uploads/orders/c.pdf", "c.pdf"),
        status: OrderStatus::New,
        price: dec!(10),
    };

    // Verify Send + Sync by spawning tasks
    let orders_handle = tokio::spawn(async move {
        order_store.store(order).await.unwrap();
        order_store
            .set_status(&OrderId::from("1"), OrderStatus::Ready, TransitionPolicy::Lenient)
            .await
            .unwrap()
            .unwrap()
    });

    let rates_handle = tokio::spawn(async move {
        let mut card = rate_store.load().await.unwrap();
        card.rush = dec!(40);
        rate_store.replace(card).await.unwrap();
        rate_store.load().await.unwrap()
    });

    let updated = orders_handle.await.unwrap();
    assert_eq!(updated.status, OrderStatus::Ready);
    assert_eq!(updated.token_id.to_string(), "C-101");

    let card = rates_handle.await.unwrap();
    assert_eq!(card.rush, dec!(40));
}

#[tokio::test]
async fn test_shared_shop_broadcasts_to_observers() {
    let hub = Broadcaster::default();
    let events: Arc<dyn EventPublisher> = Arc::new(hub.clone());
    let shop = Arc::new(PrintShop::new(
        Box::new(InMemoryOrderStore::new()),
        Box::new(InMemoryRateCardStore::new()),
        Box::new(LocalUploads),
        Box::new(DummyVerifier),
        events,
    ));
    let mut observer = hub.subscribe();

    let mut handles = Vec::new();
    for pages in 1..=8u32 {
        let shop = Arc::clone(&shop);
        handles.push(tokio::spawn(async move {
            let options = OrderOptions::Document(DocumentOptions {
                pages: Count::from(pages),
                print_type: PrintType::Bw,
                ..DocumentOptions::default()
            });
            let file = UploadedFile::new(format!("uploads/orders/{pages}.pdf"), "job.pdf");
            let checkout = shop.checkout(options, file, "9876543210").await.unwrap();
            let confirmation = PaymentConfirmation {
                gateway_order_id: checkout.request.order_id.clone().unwrap(),
                ..PaymentConfirmation::default()
            };
            shop.confirm_payment(&confirmation, Some(checkout.context))
                .await
                .unwrap()
        }));
    }

    let mut numbers = Vec::new();
    for handle in handles {
        numbers.push(handle.await.unwrap().token_id.number);
    }
    numbers.sort();
    assert_eq!(numbers, (101..=108).collect::<Vec<u64>>());

    let mut received = 0;
    while let Some(event) = observer.try_recv() {
        assert!(matches!(event, OrderEvent::NewOrder(_)));
        received += 1;
    }
    assert_eq!(received, 8);

    let stats = shop.stats().await.unwrap();
    assert_eq!(stats.total_orders, 8);
    // 2 * (1 + 2 + ... + 8)
    assert_eq!(stats.total_revenue, dec!(72));
}
