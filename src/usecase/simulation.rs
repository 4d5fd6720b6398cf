//! ルームごとのシミュレーションループ
//!
//! ルームが playing の間、3 本の周期タスクを走らせます。
//!
//! - countdown: 1 秒ごとに残り時間を減らして通知、0 でゲーム終了
//! - spawner: 5 秒ごとにリソースを生成（上限 30）
//! - weather: 30 秒ごとに天候を変化
//!
//! タスクハンドルはスケジューラ側で保持し、Room は純粋なデータのままに
//! します。各 tick はストアのロックを取ってから状態を確認するため、
//! 一時停止・削除済みのルームのループは自律的に停止します。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep};
use tracing::info;

use crate::domain::{BroadcastGateway, RoomCode};
use crate::domain::room::RoomState;
use crate::infrastructure::RoomStore;
use crate::protocol::ServerEvent;

use super::broadcast_event;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub countdown_interval: Duration,
    pub spawn_interval: Duration,
    pub weather_interval: Duration,
    /// How long a finished room lingers before deletion, giving clients
    /// time to show the results screen.
    pub room_delete_delay: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            countdown_interval: Duration::from_secs(1),
            spawn_interval: Duration::from_secs(5),
            weather_interval: Duration::from_secs(30),
            room_delete_delay: Duration::from_secs(20),
        }
    }
}

struct RoomTasks {
    countdown: JoinHandle<()>,
    spawner: JoinHandle<()>,
    weather: JoinHandle<()>,
}

impl RoomTasks {
    fn abort_all(&self) {
        self.countdown.abort();
        self.spawner.abort();
        self.weather.abort();
    }
}

enum Tick {
    Countdown,
    Spawn,
    Weather,
}

pub struct SimulationScheduler {
    store: Arc<RoomStore>,
    gateway: Arc<dyn BroadcastGateway>,
    config: SimulationConfig,
    tasks: Mutex<HashMap<RoomCode, RoomTasks>>,
}

impl SimulationScheduler {
    pub fn new(
        store: Arc<RoomStore>,
        gateway: Arc<dyn BroadcastGateway>,
        config: SimulationConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            config,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Start (or restart) the loops for a room. The countdown resets to the
    /// room's full duration, and the new remaining time is broadcast right
    /// away so clients never display a stale value.
    pub async fn start(self: Arc<Self>, code: RoomCode) {
        self.stop(&code).await;

        {
            let mut table = self.store.lock().await;
            let Some(room) = table.get_mut(&code) else {
                return;
            };
            let remaining = room.reset_timer();
            broadcast_event(
                self.gateway.as_ref(),
                &room.connections(),
                &ServerEvent::TimerUpdate(remaining),
            )
            .await;
        }

        let countdown =
            Self::spawn_loop(&self, &code, self.config.countdown_interval, Tick::Countdown);
        let spawner = Self::spawn_loop(&self, &code, self.config.spawn_interval, Tick::Spawn);
        let weather = Self::spawn_loop(&self, &code, self.config.weather_interval, Tick::Weather);

        let mut tasks = self.tasks.lock().await;
        tasks.insert(
            code.clone(),
            RoomTasks {
                countdown,
                spawner,
                weather,
            },
        );
        info!("Simulation started for room '{}'", code);
    }

    /// Abort the room's loops if they are running.
    pub async fn stop(&self, code: &RoomCode) {
        let mut tasks = self.tasks.lock().await;
        if let Some(entry) = tasks.remove(code) {
            entry.abort_all();
            info!("Simulation stopped for room '{}'", code);
        }
    }

    fn spawn_loop(sched: &Arc<Self>, code: &RoomCode, period: Duration, tick: Tick) -> JoinHandle<()> {
        let sched = Arc::clone(sched);
        let code = code.clone();
        tokio::spawn(async move {
            let mut ticker = interval(period);
            // the first tick of a tokio interval fires immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let keep_running = match tick {
                    Tick::Countdown => Arc::clone(&sched).countdown_tick(&code).await,
                    Tick::Spawn => sched.spawn_tick(&code).await,
                    Tick::Weather => sched.weather_tick(&code).await,
                };
                if !keep_running {
                    break;
                }
            }
        })
    }

    async fn countdown_tick(self: Arc<Self>, code: &RoomCode) -> bool {
        let remaining = {
            let mut table = self.store.lock().await;
            let Some(room) = table.get_mut(code) else {
                return false;
            };
            if room.state != RoomState::Playing {
                return false;
            }
            let remaining = room.tick_timer();
            broadcast_event(
                self.gateway.as_ref(),
                &room.connections(),
                &ServerEvent::TimerUpdate(remaining),
            )
            .await;
            remaining
        };
        if remaining == 0 {
            self.finish_game(code.clone()).await;
            return false;
        }
        true
    }

    async fn spawn_tick(&self, code: &RoomCode) -> bool {
        let mut table = self.store.lock().await;
        let Some(room) = table.get_mut(code) else {
            return false;
        };
        if room.state != RoomState::Playing {
            return false;
        }
        let spawned = {
            let mut rng = rand::thread_rng();
            room.spawn_resource(&mut rng)
        };
        if let Some(resource) = spawned {
            broadcast_event(
                self.gateway.as_ref(),
                &room.connections(),
                &ServerEvent::ResourceSpawned((&resource).into()),
            )
            .await;
        }
        true
    }

    async fn weather_tick(&self, code: &RoomCode) -> bool {
        let mut table = self.store.lock().await;
        let Some(room) = table.get_mut(code) else {
            return false;
        };
        if room.state != RoomState::Playing {
            return false;
        }
        let weather = {
            let mut rng = rand::thread_rng();
            room.change_weather(&mut rng)
        };
        broadcast_event(
            self.gateway.as_ref(),
            &room.connections(),
            &ServerEvent::WeatherUpdate(weather),
        )
        .await;
        true
    }

    /// End the game: mark the room finished, announce the result, and delete
    /// the room after a delay. Idempotent, so the countdown reaching zero
    /// and a repeated call cannot double-announce.
    pub async fn finish_game(self: Arc<Self>, code: RoomCode) {
        {
            let mut table = self.store.lock().await;
            let Some(room) = table.get_mut(&code) else {
                return;
            };
            if room.state == RoomState::Finished {
                return;
            }
            room.state = RoomState::Finished;
            let blooms = room.bloom_count();
            let message = format!(
                "Time's up! Together you brought {} flower(s) to full bloom.",
                blooms
            );
            broadcast_event(
                self.gateway.as_ref(),
                &room.connections(),
                &ServerEvent::GameOver { message, blooms },
            )
            .await;
            info!("Game over in room '{}' with {} bloom(s)", code, blooms);
        }

        // stop() aborts the countdown task that may be the current task, so
        // the teardown runs on its own task
        tokio::spawn(async move {
            self.stop(&code).await;
            sleep(self.config.room_delete_delay).await;
            let mut table = self.store.lock().await;
            let still_finished = table
                .get(&code)
                .is_some_and(|room| room.state == RoomState::Finished);
            if still_finished {
                table.remove(&code);
                info!("Room '{}' deleted after game over", code);
            }
        });
    }
}
