//! Per-connection scheduler for periodic and delayed one-shot tasks.
//!
//! The handler calls [`Ticker::advance`] once per 50 ms tick and runs the
//! returned actions in order.

#[derive(Debug, Clone)]
struct Entry<A> {
    action: A,
    fire_at: u64,
    /// `Some(n)` re-arms the entry `n` ticks after it fires.
    every: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Ticker<A> {
    tick: u64,
    entries: Vec<Entry<A>>,
}

impl<A> Default for Ticker<A> {
    fn default() -> Self {
        Self {
            tick: 0,
            entries: Vec::new(),
        }
    }
}

impl<A: Clone + PartialEq> Ticker<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` every `every` ticks, first `every` ticks from now.
    pub fn add_loop(&mut self, action: A, every: u64) {
        let every = every.max(1);
        self.entries.push(Entry {
            action,
            fire_at: self.tick + every,
            every: Some(every),
        });
    }

    /// Like [`add_loop`](Self::add_loop), replacing any loop already armed
    /// for the same action.
    pub fn add_loop_unique(&mut self, action: A, every: u64) {
        self.entries
            .retain(|e| !(e.every.is_some() && e.action == action));
        self.add_loop(action, every);
    }

    /// Run `action` once, `delay` ticks from now. A delay of zero fires on
    /// the next tick.
    pub fn add_delay(&mut self, action: A, delay: u64) {
        self.entries.push(Entry {
            action,
            fire_at: self.tick + delay.max(1),
            every: None,
        });
    }

    /// Drop every pending entry for `action`.
    pub fn cancel(&mut self, action: &A) {
        self.entries.retain(|e| e.action != *action);
    }

    /// Move one tick forward and return the actions due, in the order they
    /// were armed. Loops are re-armed; one-shots are removed.
    pub fn advance(&mut self) -> Vec<A> {
        self.tick += 1;
        let now = self.tick;
        let mut due = Vec::new();
        self.entries.retain_mut(|e| {
            if e.fire_at > now {
                return true;
            }
            due.push(e.action.clone());
            match e.every {
                Some(every) => {
                    e.fire_at = now + every;
                    true
                }
                None => false,
            }
        });
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(ticker: &mut Ticker<&'static str>, ticks: u64) -> Vec<(u64, &'static str)> {
        let start = ticker.tick;
        let mut fired = Vec::new();
        for n in 1..=ticks {
            fired.extend(ticker.advance().into_iter().map(|a| (start + n, a)));
        }
        fired
    }

    #[test]
    fn delay_fires_once() {
        let mut t = Ticker::new();
        t.add_delay("world", 1);
        t.add_delay("music", 20);
        let fired = run(&mut t, 40);
        assert_eq!(fired, vec![(1, "world"), (20, "music")]);
        assert!(t.entries.is_empty());
    }

    #[test]
    fn loop_repeats() {
        let mut t = Ticker::new();
        t.add_loop("keepalive", 100);
        let fired = run(&mut t, 350);
        assert_eq!(
            fired,
            vec![(100, "keepalive"), (200, "keepalive"), (300, "keepalive")]
        );
        assert_eq!(t.entries.len(), 1);
    }

    #[test]
    fn same_tick_keeps_arm_order() {
        let mut t = Ticker::new();
        t.add_delay("b", 5);
        t.add_delay("a", 5);
        t.add_loop("c", 5);
        assert_eq!(run(&mut t, 5), vec![(5, "b"), (5, "a"), (5, "c")]);
    }

    #[test]
    fn unique_loop_replaces_previous() {
        let mut t = Ticker::new();
        t.add_loop_unique("time", 100);
        run(&mut t, 50);
        t.add_loop_unique("time", 100);
        assert_eq!(t.entries.len(), 1);
        // the replacement counts from tick 50
        assert_eq!(run(&mut t, 100), vec![(150, "time")]);
    }

    #[test]
    fn unique_loop_leaves_one_shots() {
        let mut t = Ticker::new();
        t.add_delay("time", 3);
        t.add_loop_unique("time", 10);
        assert_eq!(t.entries.len(), 2);
    }

    #[test]
    fn cancel_removes_pending() {
        let mut t = Ticker::new();
        t.add_delay("world", 2);
        t.add_loop("keepalive", 1);
        t.cancel(&"world");
        assert_eq!(run(&mut t, 2), vec![(1, "keepalive"), (2, "keepalive")]);
    }

    #[test]
    fn zero_delay_fires_next_tick() {
        let mut t = Ticker::new();
        t.add_delay("now", 0);
        assert_eq!(run(&mut t, 1), vec![(1, "now")]);
    }
}
