//! デバウンスタイマー
//!
//! 連続する編集イベントを一定時間まとめるための単発タイマー。
//! 単一スレッドのイベントループから schedule / poll される前提で、
//! スレッドもチャネルも使わない。

use std::time::{Duration, Instant};

/// 単発のデバウンスタイマー
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// タイマーを（再）スケジュールする。既存の予約は上書きされる
    pub fn schedule(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    /// 予約を取り消す
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// 予約が残っているか
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// 期限が到来していれば true を返し、予約を消費する
    pub fn poll(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_only_after_delay() {
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.schedule();
        assert!(debouncer.is_pending());
        assert!(!debouncer.poll());
        std::thread::sleep(Duration::from_millis(15));
        assert!(debouncer.poll());
        // 消費済み
        assert!(!debouncer.poll());
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn reschedule_pushes_deadline_back() {
        let mut debouncer = Debouncer::new(Duration::from_millis(20));
        debouncer.schedule();
        std::thread::sleep(Duration::from_millis(10));
        debouncer.schedule();
        std::thread::sleep(Duration::from_millis(12));
        // 2 回目の予約からはまだ 20ms 経っていない
        assert!(!debouncer.poll());
    }

    #[test]
    fn cancel_discards_pending_fire() {
        let mut debouncer = Debouncer::new(Duration::from_millis(1));
        debouncer.schedule();
        debouncer.cancel();
        std::thread::sleep(Duration::from_millis(5));
        assert!(!debouncer.poll());
    }
}
