//! 签退提醒调度器
//!
//! 每个会话的提醒是一个三态机：
//! - disabled: 注册表中没有条目
//! - armed:    条目带着下一次触发时间 `next_fire_at`
//! - firing:   到点后记录一条提醒事件，随即按下一个间隔边界重新武装
//!
//! 全服务只有一个调度任务持有定时器。处理器通过 [`ReminderRegistry`]
//! 武装 / 解除提醒，注册表用 `Notify` 叫醒调度器重算最早的截止时间。
//! `tokio::select!` 同时等待定时器、变更通知和关闭信号。
//!
//! 开关状态持久化在 `session.reminder_enabled`，重启后调度器
//! 扫描 active 会话恢复武装，下一次触发时间从原始签到时刻重新推算。

use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::core::ServerState;
use crate::db::repository::SessionRepository;
use crate::utils::time::{self, MILLIS_PER_MINUTE};

/// 没有任何提醒武装时的空转睡眠时长
const IDLE_WAIT: Duration = Duration::from_secs(3600);

/// 单个武装会话的调度状态
#[derive(Debug, Clone)]
pub struct ReminderEntry {
    /// 原始签到时刻，触发边界从这里推算
    pub check_in: i64,
    /// 下一次触发时间 (Unix millis)
    pub next_fire_at: i64,
    /// 最近一次触发时间，状态页展示用
    pub last_reminder_at: Option<i64>,
}

/// 武装会话注册表 - 处理器和调度器共享
#[derive(Debug)]
pub struct ReminderRegistry {
    entries: DashMap<String, ReminderEntry>,
    changed: Notify,
    interval_ms: i64,
}

impl ReminderRegistry {
    pub fn new(interval_minutes: i64) -> Self {
        Self {
            entries: DashMap::new(),
            changed: Notify::new(),
            interval_ms: interval_minutes.max(1) * MILLIS_PER_MINUTE,
        }
    }

    /// 武装 (或重新武装) 一个会话，返回计划的触发时间
    pub fn arm(&self, session_id: &str, check_in: i64) -> i64 {
        let now = time::now_millis();
        let next_fire_at = time::next_interval_boundary(check_in, now, self.interval_ms);
        // 重复武装不丢已有的 last_reminder_at
        let last_reminder_at = self
            .entries
            .get(session_id)
            .and_then(|e| e.last_reminder_at);
        self.entries.insert(
            session_id.to_string(),
            ReminderEntry {
                check_in,
                next_fire_at,
                last_reminder_at,
            },
        );
        self.changed.notify_one();
        next_fire_at
    }

    /// 解除武装，幂等
    pub fn disarm(&self, session_id: &str) {
        if self.entries.remove(session_id).is_some() {
            self.changed.notify_one();
        }
    }

    pub fn is_armed(&self, session_id: &str) -> bool {
        self.entries.contains_key(session_id)
    }

    /// 某会话最近一次提醒的触发时间
    pub fn last_reminder_at(&self, session_id: &str) -> Option<i64> {
        self.entries
            .get(session_id)
            .and_then(|e| e.last_reminder_at)
    }

    /// 变更通知 (调度器在 select 里等它)
    pub fn changed(&self) -> &Notify {
        &self.changed
    }

    /// 所有武装会话里最早的触发时间
    fn earliest_deadline(&self) -> Option<i64> {
        self.entries.iter().map(|e| e.next_fire_at).min()
    }

    /// 取出到点的会话并就地重新武装
    ///
    /// 返回 `(session_id, check_in)` 列表供调度器发事件。
    fn take_due(&self, now: i64) -> Vec<(String, i64)> {
        let due: Vec<(String, i64)> = self
            .entries
            .iter()
            .filter(|e| e.next_fire_at <= now)
            .map(|e| (e.key().clone(), e.check_in))
            .collect();

        let mut fired = Vec::with_capacity(due.len());
        for (session_id, check_in) in due {
            if let Some(mut entry) = self.entries.get_mut(&session_id) {
                entry.last_reminder_at = Some(now);
                entry.next_fire_at = time::next_interval_boundary(check_in, now, self.interval_ms);
                fired.push((session_id, check_in));
            }
        }
        fired
    }
}

/// 调度任务本体，由 `ServerState::start_background_tasks` spawn
pub struct ReminderScheduler {
    state: ServerState,
    shutdown: CancellationToken,
}

impl ReminderScheduler {
    pub fn new(state: ServerState, shutdown: CancellationToken) -> Self {
        Self { state, shutdown }
    }

    pub async fn run(self) {
        tracing::info!(
            interval_minutes = self.state.config.checkout_reminder_minutes,
            "Checkout reminder scheduler started"
        );
        self.rearm_from_db().await;

        let registry = self.state.reminders.clone();
        loop {
            let sleep_duration = match registry.earliest_deadline() {
                Some(deadline) => {
                    let now = time::now_millis();
                    Duration::from_millis((deadline - now).max(0) as u64)
                }
                None => IDLE_WAIT,
            };

            tokio::select! {
                _ = tokio::time::sleep(sleep_duration) => {
                    self.fire_due().await;
                }
                _ = registry.changed().notified() => {
                    // 重算最早截止时间
                }
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Checkout reminder scheduler received shutdown signal");
                    return;
                }
            }
        }
    }

    /// 重启恢复：把数据库里仍然武装的 active 会话装回注册表
    async fn rearm_from_db(&self) {
        let repo = SessionRepository::new(self.state.db.clone());
        match repo.find_armed_active().await {
            Ok(sessions) if sessions.is_empty() => {
                tracing::debug!("No armed reminder sessions to restore");
            }
            Ok(sessions) => {
                for session in &sessions {
                    if let Some(id) = &session.id {
                        self.state.reminders.arm(&id.to_string(), session.check_in);
                    }
                }
                tracing::info!("Restored {} armed checkout reminder(s)", sessions.len());
            }
            Err(e) => {
                tracing::error!("Failed to restore reminder sessions: {}", e);
            }
        }
    }

    async fn fire_due(&self) {
        let now = time::now_millis();
        let fired = self.state.reminders.take_due(now);
        if fired.is_empty() {
            return;
        }

        let repo = SessionRepository::new(self.state.db.clone());
        for (session_id, check_in) in fired {
            // 会话在签退路径之外被关闭时不能继续触发
            match repo.find_by_id(&session_id).await {
                Ok(Some(session)) if session.is_active() => {
                    tracing::info!(
                        target: "notification",
                        session_id = %session_id,
                        display_name = session.display_name.as_deref().unwrap_or(""),
                        elapsed = %time::format_duration_millis(now - check_in),
                        "Checkout reminder fired"
                    );
                }
                Ok(_) => {
                    self.state.reminders.disarm(&session_id);
                    tracing::debug!(session_id = %session_id, "Dropping reminder for closed session");
                }
                Err(e) => {
                    tracing::error!(session_id = %session_id, "Failed to load session for reminder: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::time::MILLIS_PER_HOUR;

    #[test]
    fn test_arm_schedules_next_interval_boundary() {
        let registry = ReminderRegistry::new(120);
        let now = time::now_millis();
        let check_in = now - 30 * MILLIS_PER_MINUTE;

        let deadline = registry.arm("session:a", check_in);

        assert!(registry.is_armed("session:a"));
        assert!(deadline > now);
        // Deadlines always sit on a check_in + k * interval boundary
        assert_eq!((deadline - check_in) % (2 * MILLIS_PER_HOUR), 0);
    }

    #[test]
    fn test_disarm_removes_entry() {
        let registry = ReminderRegistry::new(120);
        registry.arm("session:b", time::now_millis());
        assert!(registry.is_armed("session:b"));

        registry.disarm("session:b");
        assert!(!registry.is_armed("session:b"));
        assert_eq!(registry.last_reminder_at("session:b"), None);

        // Idempotent
        registry.disarm("session:b");
    }

    #[test]
    fn test_earliest_deadline_picks_minimum() {
        let registry = ReminderRegistry::new(120);
        let now = time::now_millis();
        registry.arm("session:late", now - 10 * MILLIS_PER_MINUTE);
        registry.arm("session:early", now - 110 * MILLIS_PER_MINUTE);

        let earliest = registry.earliest_deadline().unwrap();
        let early_entry = registry.entries.get("session:early").unwrap();
        assert_eq!(earliest, early_entry.next_fire_at);
    }

    #[test]
    fn test_take_due_fires_and_rearms() {
        let registry = ReminderRegistry::new(120);
        let now = time::now_millis();
        let check_in = now - 30 * MILLIS_PER_MINUTE;
        registry.arm("session:c", check_in);

        // Nothing due yet
        assert!(registry.take_due(now).is_empty());

        // Force the deadline into the past
        registry
            .entries
            .get_mut("session:c")
            .unwrap()
            .next_fire_at = now - 1;

        let fired = registry.take_due(now);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].0, "session:c");

        // Firing records the time and re-arms on a future boundary
        assert_eq!(registry.last_reminder_at("session:c"), Some(now));
        let entry = registry.entries.get("session:c").unwrap();
        assert!(entry.next_fire_at > now);
        assert_eq!((entry.next_fire_at - check_in) % (2 * MILLIS_PER_HOUR), 0);
    }

    #[test]
    fn test_rearm_preserves_last_reminder_at() {
        let registry = ReminderRegistry::new(120);
        let now = time::now_millis();
        registry.arm("session:d", now - MILLIS_PER_HOUR);
        registry
            .entries
            .get_mut("session:d")
            .unwrap()
            .last_reminder_at = Some(now - MILLIS_PER_MINUTE);

        registry.arm("session:d", now - MILLIS_PER_HOUR);
        assert_eq!(
            registry.last_reminder_at("session:d"),
            Some(now - MILLIS_PER_MINUTE)
        );
    }
}
