// worker thread plumbing shared by every pool
use super::queue::TaskQueue;
use super::task::{Task, TaskOutcome};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::telemetry::Metrics;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

pub type WorkerId = usize;

#[cfg(target_os = "linux")]
fn pin_thread_to_core(core_id: usize) {
    let cores = num_cpus::get();
    let core_id = core_id % cores.max(1);
    // SAFETY: cpu_set_t is plain data; zeroed is the empty set.
    let result = unsafe {
        let mut cpuset: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_SET(core_id, &mut cpuset);
        libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &cpuset)
    };
    if result != 0 {
        tracing::warn!(
            thread = thread::current().name().unwrap_or("unknown"),
            core = core_id,
            "failed to pin worker to core"
        );
    }
}

#[cfg(not(target_os = "linux"))]
fn pin_thread_to_core(_core_id: usize) {
    tracing::debug!("worker pinning is only supported on linux");
}

/// Run one task and account for it.
pub(crate) fn execute_task(task: Task, metrics: &Metrics) {
    let start = Instant::now();
    let outcome = task.run();
    let duration_ns = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);

    metrics.record_task_execution(duration_ns);
    if outcome == TaskOutcome::Panicked {
        metrics.record_task_panic();
    }
}

/// Spawn `config.worker_threads()` workers, each running `body(id)`.
///
/// If a spawn fails, `queues` are finished and the workers started so far are
/// joined before the error is returned.
pub(crate) fn spawn_workers<B>(
    config: &Config,
    queues: &[TaskQueue],
    body: B,
) -> Result<Vec<JoinHandle<()>>>
where
    B: Fn(WorkerId) + Send + Sync + 'static,
{
    let num_threads = config.worker_threads();
    let body = Arc::new(body);
    let mut handles = Vec::with_capacity(num_threads);

    for id in 0..num_threads {
        let name = format!("{}-{}", config.thread_name_prefix, id);
        let mut builder = thread::Builder::new().name(name);
        if let Some(stack_size) = config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let pin_workers = config.pin_workers;
        let body = body.clone();
        let spawned = builder.spawn(move || {
            if pin_workers {
                pin_thread_to_core(id);
            }
            tracing::debug!(worker = id, "worker started");
            body(id);
            tracing::debug!(worker = id, "worker stopped");
        });

        match spawned {
            Ok(handle) => handles.push(handle),
            Err(e) => {
                tracing::error!(worker = id, error = %e, "failed to spawn worker");
                shutdown_workers(queues, &mut handles);
                return Err(Error::Io(e));
            }
        }
    }

    Ok(handles)
}

/// Finish every queue, then join every worker. The order matters: a worker
/// blocked in `pop` only returns once its queue is finished.
///
/// When called from one of the workers themselves (the pool dropped inside a
/// task), that worker is detached instead of joined; it drains its queue and
/// exits once the task returns.
pub(crate) fn shutdown_workers(queues: &[TaskQueue], handles: &mut Vec<JoinHandle<()>>) {
    for queue in queues {
        queue.finish();
    }

    let current = thread::current().id();
    for handle in handles.drain(..) {
        let name = handle.thread().name().map(str::to_owned);
        if handle.thread().id() == current {
            tracing::debug!(worker = name.as_deref().unwrap_or("unnamed"), "shutdown from own worker, detaching");
            continue;
        }
        if handle.join().is_err() {
            tracing::error!(worker = name.as_deref().unwrap_or("unnamed"), "worker thread panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_spawn_names_threads() {
        let config = Config::builder()
            .num_threads(3)
            .thread_name_prefix("probe")
            .build()
            .unwrap();
        let names = Arc::new(Mutex::new(Vec::new()));

        let names_clone = names.clone();
        let mut handles = spawn_workers(&config, &[], move |_| {
            let name = thread::current().name().map(str::to_owned);
            names_clone.lock().push(name);
        })
        .unwrap();
        shutdown_workers(&[], &mut handles);
        assert!(handles.is_empty());

        let mut names: Vec<_> = names.lock().iter().flatten().cloned().collect();
        names.sort();
        assert_eq!(names, vec!["probe-0", "probe-1", "probe-2"]);
    }

    #[test]
    fn test_shutdown_finishes_then_joins() {
        let config = Config::with_threads(2);
        let queues: Arc<Vec<TaskQueue>> = Arc::new((0..2).map(|_| TaskQueue::new()).collect());

        let worker_queues = queues.clone();
        let mut handles = spawn_workers(&config, &queues, move |id| {
            while let Some(task) = worker_queues[id].pop() {
                task.run();
            }
        })
        .unwrap();

        let a = queues[0].spawn(|| 1);
        let b = queues[1].spawn(|| 2);
        shutdown_workers(&queues, &mut handles);

        assert_eq!(a.join().unwrap() + b.join().unwrap(), 3);
        assert!(queues.iter().all(|q| q.is_finished()));
    }

    #[test]
    fn test_shutdown_from_worker_skips_itself() {
        let config = Config::with_threads(2);
        let queues: Arc<Vec<TaskQueue>> = Arc::new((0..2).map(|_| TaskQueue::new()).collect());
        let handles = Arc::new(Mutex::new(Vec::new()));

        let worker_queues = queues.clone();
        *handles.lock() = spawn_workers(&config, &queues, move |id| {
            while let Some(task) = worker_queues[id].pop() {
                task.run();
            }
        })
        .unwrap();

        let task_queues = queues.clone();
        let task_handles = handles.clone();
        let from_worker = queues[0].spawn(move || {
            let mut taken = std::mem::take(&mut *task_handles.lock());
            shutdown_workers(&task_queues, &mut taken);
            taken.is_empty()
        });

        assert!(from_worker.join().unwrap());
        assert!(queues.iter().all(|q| q.is_finished()));
    }

    #[cfg(all(target_os = "linux", target_pointer_width = "64"))]
    #[test]
    fn test_spawn_failure_is_io_error() {
        // Larger than the address space, so thread creation fails.
        let config = Config::builder()
            .num_threads(2)
            .stack_size(1 << 60)
            .build()
            .unwrap();
        let queues = [TaskQueue::new()];

        let err = spawn_workers(&config, &queues, |_| {}).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(queues[0].is_finished());
    }

    #[test]
    fn test_execute_task_records_metrics() {
        let metrics = Metrics::new();
        let (ok, _h1) = Task::new(|| 1);
        let (bad, _h2) = Task::new(|| -> i32 { panic!("bad task") });

        execute_task(ok, &metrics);
        execute_task(bad, &metrics);

        #[cfg(feature = "telemetry")]
        {
            let snapshot = metrics.snapshot();
            assert_eq!(snapshot.tasks_executed, 2);
            assert_eq!(snapshot.tasks_panicked, 1);
        }
    }
}
