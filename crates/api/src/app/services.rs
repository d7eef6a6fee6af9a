use std::sync::{Arc, Mutex};

use tracing::info;

use supplyflow_events::InMemoryEventBus;
use supplyflow_infra::workers::{LoggingNotificationSink, NotificationWorker, WorkerHandle};
use supplyflow_infra::{
    AppConfig, CartService, CatalogAdmin, ChangeNotifier, InMemoryCartStore, InMemoryCatalog,
    InMemoryOrderStore, InMemoryStockLedger, OrderEnvelope, OrderFactory, OrderQueries,
    OrderStateMachine,
};

pub type Ledger = Arc<InMemoryStockLedger>;
pub type Catalog = Arc<InMemoryCatalog>;
pub type Bus = Arc<InMemoryEventBus<OrderEnvelope>>;
pub type Orders = Arc<ChangeNotifier<Arc<InMemoryOrderStore>, Bus>>;

/// Everything the handlers need, wired once per process.
pub struct AppServices {
    pub carts: CartService<Ledger, Catalog>,
    pub factory: OrderFactory<Ledger, Catalog, Orders>,
    pub machine: OrderStateMachine<Orders, Ledger>,
    pub queries: OrderQueries<Orders>,
    pub admin: CatalogAdmin<Catalog, Ledger>,
    worker: Mutex<Option<WorkerHandle>>,
}

impl AppServices {
    /// In-memory wiring: one ledger and catalog, the order store wrapped by
    /// the change notifier, and a notification worker logging every event.
    pub fn in_memory(config: &AppConfig) -> std::io::Result<Self> {
        let ledger: Ledger = Arc::new(InMemoryStockLedger::new());
        let catalog: Catalog = Arc::new(InMemoryCatalog::new());
        let carts = Arc::new(InMemoryCartStore::new());
        let bus: Bus = Arc::new(InMemoryEventBus::new());
        let orders: Orders = Arc::new(ChangeNotifier::new(
            Arc::new(InMemoryOrderStore::new()),
            bus.clone(),
        ));

        let worker = NotificationWorker::spawn("order-notifications", &bus, LoggingNotificationSink)?;

        info!(
            transition_retries = config.transition_retries,
            "in-memory services wired"
        );

        Ok(Self {
            carts: CartService::new(carts.clone(), ledger.clone(), catalog.clone()),
            factory: OrderFactory::new(carts, ledger.clone(), catalog.clone(), orders.clone()),
            machine: OrderStateMachine::new(orders.clone(), ledger.clone(), config.transition_retries),
            queries: OrderQueries::new(orders),
            admin: CatalogAdmin::new(catalog, ledger),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Stop the notification worker after it drains what is queued.
    pub fn shutdown(&self) {
        let handle = match self.worker.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            handle.shutdown();
        }
    }
}
