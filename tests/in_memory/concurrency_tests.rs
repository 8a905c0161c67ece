//! In-memory integration tests for concurrent dispatch and registry
//! mutation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::in_memory::helpers::{TestService, click, service};
use rstest::rstest;
use switchboard::interactions::{
    adapters::memory::ServiceCollection,
    domain::{
        CommandCall, ErrorKind, HandlerError, InteractionModule, ModuleBuilder, ParameterBuilder,
    },
    ports::ServiceResolver,
};

#[derive(Debug, Default)]
struct Tally {
    clicks: AtomicUsize,
    total: AtomicUsize,
}

struct Counter {
    tally: Arc<Tally>,
}

impl InteractionModule for Counter {
    fn construct(services: &dyn ServiceResolver) -> Result<Self, HandlerError> {
        Ok(Self {
            tally: services.resolve::<Tally>()?,
        })
    }
}

struct Late<const N: usize>;

impl<const N: usize> InteractionModule for Late<N> {
    fn construct(_services: &dyn ServiceResolver) -> Result<Self, HandlerError> {
        Ok(Self)
    }
}

fn counter() -> ModuleBuilder<Counter> {
    ModuleBuilder::<Counter>::new().component_command("count:*", |command| {
        command
            .parameter(ParameterBuilder::of::<usize>("amount"))
            .handler(|module: Arc<Counter>, call: CommandCall| async move {
                let amount = *call.arguments.required::<usize>(0)?;
                module.tally.clicks.fetch_add(1, Ordering::SeqCst);
                module.tally.total.fetch_add(amount, Ordering::SeqCst);
                Ok::<_, HandlerError>(())
            })
    })
}

fn late<const N: usize>() -> ModuleBuilder<Late<N>> {
    ModuleBuilder::<Late<N>>::new().component_command(format!("late-{N}"), |command| {
        command.handler(|_module, _call| async {})
    })
}

fn tally_resolver(tally: &Arc<Tally>) -> Arc<dyn ServiceResolver> {
    let mut services = ServiceCollection::new();
    services.insert(Arc::clone(tally));
    Arc::new(services)
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_dispatches_share_one_registry(service: TestService) {
    service.add_module(counter()).await.expect("module loads");
    let service = Arc::new(service);
    let tally = Arc::new(Tally::default());

    let tasks: Vec<_> = (1..=32_usize)
        .map(|amount| {
            let service = Arc::clone(&service);
            let services = tally_resolver(&tally);
            tokio::spawn(async move {
                service
                    .execute(click(&format!("count:{amount}")), services)
                    .await
            })
        })
        .collect();

    for task in tasks {
        let result = task
            .await
            .expect("task joins")
            .expect("dispatch succeeds");
        assert!(result.is_success());
    }
    assert_eq!(tally.clicks.load(Ordering::SeqCst), 32);
    assert_eq!(tally.total.load(Ordering::SeqCst), (1..=32).sum::<usize>());
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn loading_never_blocks_running_dispatches(service: TestService) {
    service.add_module(counter()).await.expect("module loads");
    let service = Arc::new(service);
    let tally = Arc::new(Tally::default());

    let loader = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service.add_module(late::<0>()).await.expect("late module loads");
            service.add_module(late::<1>()).await.expect("late module loads");
            service.add_module(late::<2>()).await.expect("late module loads");
            service.add_module(late::<3>()).await.expect("late module loads");
        })
    };
    let dispatchers: Vec<_> = (0..16)
        .map(|_| {
            let service = Arc::clone(&service);
            let services = tally_resolver(&tally);
            tokio::spawn(async move { service.execute(click("count:1"), services).await })
        })
        .collect();

    loader.await.expect("loader joins");
    for dispatcher in dispatchers {
        let result = dispatcher
            .await
            .expect("task joins")
            .expect("dispatch succeeds");
        assert!(result.is_success());
    }
    assert_eq!(tally.clicks.load(Ordering::SeqCst), 16);
    assert_eq!(service.component_commands().len(), 5);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rejected_loads_leave_the_registry_untouched(service: TestService) {
    service.add_module(counter()).await.expect("module loads");

    let outcome = service.add_module(counter()).await;

    assert!(outcome.is_err());
    assert_eq!(service.modules().len(), 1);
    let tally = Arc::new(Tally::default());
    let result = service
        .execute(click("count:2"), tally_resolver(&tally))
        .await
        .expect("dispatch succeeds");
    assert!(result.is_success());
    assert_eq!(tally.total.load(Ordering::SeqCst), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unloaded_identifiers_are_unknown(service: TestService) {
    service.add_module(counter()).await.expect("module loads");
    service
        .remove_module_for::<Counter>()
        .await
        .expect("module unloads");

    let tally = Arc::new(Tally::default());
    let result = service
        .execute(click("count:2"), tally_resolver(&tally))
        .await
        .expect("dispatch completes");

    assert_eq!(result.error_kind(), Some(ErrorKind::UnknownCommand));
    assert_eq!(tally.clicks.load(Ordering::SeqCst), 0);
}
