#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use taskwave::{start_tasks, Startable, TaskSet};
    use tokio::time::sleep;

    async fn settle() {
        sleep(Duration::from_millis(30)).await;
    }

    #[tokio::test]
    async fn tasks_run_during_scope_and_stop_after() {
        let flag = Arc::new(AtomicBool::new(false));
        let ticks = Arc::new(AtomicUsize::new(0));

        let flag_task = {
            let flag = flag.clone();
            Startable::prepared(async move {
                flag.store(true, Ordering::SeqCst);
                sleep(Duration::from_secs(3600)).await;
            })
        };
        let tick_task = {
            let ticks = ticks.clone();
            Startable::prepared(async move {
                loop {
                    ticks.fetch_add(1, Ordering::SeqCst);
                    sleep(Duration::from_millis(5)).await;
                }
            })
        };

        let out = start_tasks(flag_task, [tick_task], async {
            settle().await;
            assert!(flag.load(Ordering::SeqCst), "first task not started");
            let early = ticks.load(Ordering::SeqCst);
            settle().await;
            assert!(
                ticks.load(Ordering::SeqCst) > early,
                "ticker idle inside the scope"
            );
            "done"
        })
        .await;
        assert_eq!(out, "done");

        // After exit the ticker must be frozen.
        let after = ticks.load(Ordering::SeqCst);
        settle().await;
        assert_eq!(ticks.load(Ordering::SeqCst), after, "ticker outlived the scope");
        println!("✓ background tasks cancelled on scope exit");
    }

    #[tokio::test]
    async fn factory_and_prepared_both_start() {
        let a = Arc::new(AtomicBool::new(false));
        let b = Arc::new(AtomicBool::new(false));

        let prepared = {
            let a = a.clone();
            Startable::prepared(async move {
                a.store(true, Ordering::SeqCst);
                sleep(Duration::from_secs(3600)).await;
            })
        };
        let factory = {
            let b = b.clone();
            Startable::factory(move || async move {
                b.store(true, Ordering::SeqCst);
                sleep(Duration::from_secs(3600)).await;
            })
        };

        start_tasks(prepared, [factory], async {
            settle().await;
            assert!(a.load(Ordering::SeqCst));
            assert!(b.load(Ordering::SeqCst));
        })
        .await;
    }

    #[tokio::test]
    async fn whole_set_starts_before_body_runs() {
        let set = TaskSet::start((0..4).map(|_| {
            Startable::factory(|| async {
                sleep(Duration::from_secs(3600)).await;
            })
        }));
        // Spawning is synchronous, so all four are registered already.
        assert_eq!(set.len(), 4);
        assert!(!set.is_cancelled());
        set.shutdown().await;
    }

    #[tokio::test]
    async fn dropping_the_set_cancels_everything() {
        let ticks = Arc::new(AtomicUsize::new(0));
        {
            let ticks = ticks.clone();
            let _set = TaskSet::start([Startable::prepared(async move {
                loop {
                    ticks.fetch_add(1, Ordering::SeqCst);
                    sleep(Duration::from_millis(5)).await;
                }
            })]);
            settle().await;
        } // dropped here, mid-flight

        settle().await;
        let frozen = ticks.load(Ordering::SeqCst);
        assert!(frozen > 0, "ticker never ran");
        settle().await;
        assert_eq!(ticks.load(Ordering::SeqCst), frozen);
    }

    #[tokio::test]
    async fn body_error_still_cancels_tasks() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let task = {
            let ticks = ticks.clone();
            Startable::prepared(async move {
                loop {
                    ticks.fetch_add(1, Ordering::SeqCst);
                    sleep(Duration::from_millis(5)).await;
                }
            })
        };

        let out: Result<(), &str> = start_tasks(task, [], async {
            settle().await;
            Err("body failed")
        })
        .await;
        assert_eq!(out, Err("body failed"));

        let after = ticks.load(Ordering::SeqCst);
        settle().await;
        assert_eq!(ticks.load(Ordering::SeqCst), after);
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let set = TaskSet::start([Startable::prepared(async {
            sleep(Duration::from_secs(3600)).await;
        })]);
        set.cancel();
        set.cancel();
        assert!(set.is_cancelled());
        set.shutdown().await;
    }

    #[tokio::test]
    async fn short_lived_task_may_finish_on_its_own() {
        let done = Arc::new(AtomicBool::new(false));
        let task = {
            let done = done.clone();
            Startable::prepared(async move {
                done.store(true, Ordering::SeqCst);
            })
        };
        start_tasks(task, [], async {
            settle().await;
        })
        .await;
        assert!(done.load(Ordering::SeqCst));
    }
}
