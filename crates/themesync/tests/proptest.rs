//! Property-based tests for theme resolution and synchronization.

use proptest::prelude::*;
use themesync::host::mock::{MockFlag, MockSignal, MockStore};
use themesync::{apply_initial_theme, resolve, ThemeMode, ThemeSync, DEFAULT_STORAGE_KEY};

fn mode_strategy() -> impl Strategy<Value = ThemeMode> {
    prop::sample::select(ThemeMode::ALL.to_vec())
}

fn store_for(mode: ThemeMode) -> MockStore {
    match mode.as_persisted() {
        Some(value) => MockStore::with_entry(DEFAULT_STORAGE_KEY, value),
        None => MockStore::new(),
    }
}

#[derive(Debug, Clone)]
enum Action {
    Set(ThemeMode),
    FollowSystem,
    Toggle,
    Environment(bool),
    Teardown,
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        mode_strategy().prop_map(Action::Set),
        Just(Action::FollowSystem),
        Just(Action::Toggle),
        any::<bool>().prop_map(Action::Environment),
        Just(Action::Teardown),
    ]
}

proptest! {
    #[test]
    fn bootstrap_and_mount_agree(mode in mode_strategy(), env in any::<bool>()) {
        let store = store_for(mode);
        let signal = MockSignal::new(env);
        let boot_flag = MockFlag::new();
        let mount_flag = MockFlag::new();

        let booted = apply_initial_theme(&store, &signal, &boot_flag);
        let sync = ThemeSync::mount(store, signal, mount_flag.clone());

        prop_assert_eq!(booted, resolve(mode, env));
        prop_assert_eq!(booted, sync.effective());
        prop_assert_eq!(boot_flag.is_dark(), mount_flag.is_dark());
    }

    #[test]
    fn flag_and_subscription_invariants_hold(
        initial in mode_strategy(),
        env in any::<bool>(),
        actions in prop::collection::vec(action_strategy(), 0..24),
    ) {
        let signal = MockSignal::new(env);
        let flag = MockFlag::new();
        let sync = ThemeSync::mount(store_for(initial), signal.clone(), flag.clone());
        let mut torn_down = false;

        for action in actions {
            match action {
                Action::Set(mode) => { sync.set_mode(mode); torn_down = false; }
                Action::FollowSystem => { sync.follow_system(); torn_down = false; }
                Action::Toggle => { sync.toggle(); torn_down = false; }
                Action::Environment(dark) => signal.fire(dark),
                Action::Teardown => { sync.teardown(); torn_down = true; }
            }

            prop_assert!(signal.active_subscriptions() <= 1);
            prop_assert_eq!(
                sync.is_subscribed(),
                sync.is_following_system() && !torn_down
            );
            prop_assert_eq!(signal.active_subscriptions(), usize::from(sync.is_subscribed()));
            if !torn_down {
                prop_assert_eq!(flag.is_dark(), sync.effective().is_dark());
            }
        }
    }
}
