//! Latency-bounded reordering of inbound RTP packets.
//!
//! The buffer accepts packets in any order and releases them in strictly
//! increasing sequence order, delaying each by at most `latency` beyond the
//! arrival of the earliest still-unreleased packet. Sequence numbers are
//! 16-bit and compared with serial arithmetic (RFC 1982), so wrap-around at
//! 65535 is handled structurally.
//!
//! Each operation returns the released packets together with the delay until
//! the next deadline; the owning task re-arms its timer from that value and
//! calls [`JitterBuffer::handle_timeout`] when it fires. No timers run
//! inside the buffer itself.


use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};

use rtp::packet::Packet;

/// Default release latency.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(100);

/// Half the sequence number space; the serial-arithmetic window.
const UINT16SIZE_HALF: u16 = 1 << 15;

/// Offset applied to the first extended sequence number so the extended
/// space never underflows.
const EXTENDED_BASE: u64 = 1 << 16;

/// Counters for the media-plane soft drops. Nothing in here is an error;
/// duplicates, late arrivals and padding are classified and discarded.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct JitterBufferStats {
    pub received: u64,
    pub released: u64,
    pub dropped_late: u64,
    pub dropped_duplicate: u64,
    pub discarded_padding: u64,
}

/// The result of one buffer operation: packets released in sequence order,
/// and the delay until the earliest pending packet must be force-released.
/// A `None` timeout means nothing is pending.
#[derive(Default, Debug)]
pub struct JitterBufferOutput {
    pub packets: Vec<Packet>,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum State {
    /// No packet seen yet; the first insert establishes the base sequence.
    Initial,
    /// The base is known and no timer is outstanding.
    Buffering,
    /// Packets are pending and a release deadline has been handed out.
    TimerSet,
}

#[derive(Debug)]
struct StoredPacket {
    packet: Packet,
    arrival: Instant,
}

/// An ordered packet store with latency-bounded release.
#[derive(Debug)]
pub struct JitterBuffer {
    latency: Duration,
    state: State,
    /// Pending packets keyed by extended (wrap-unrolled) sequence number.
    store: BTreeMap<u64, StoredPacket>,
    /// Insertion order; arrivals are monotone, so the front entry that is
    /// still stored carries the earliest deadline.
    arrivals: VecDeque<(u64, Instant)>,
    /// Extended sequence number of the next packet to release.
    next_ext: u64,
    stats: JitterBufferStats,
}

impl JitterBuffer {
    /// Creates an empty buffer. The base sequence number is taken from the
    /// first inserted packet.
    pub fn new(latency: Duration) -> Self {
        JitterBuffer {
            latency,
            state: State::Initial,
            store: BTreeMap::new(),
            arrivals: VecDeque::new(),
            next_ext: 0,
            stats: JitterBufferStats::default(),
        }
    }

    /// Creates a buffer whose first expected sequence number is known ahead
    /// of time, e.g. announced out of band. Packets before `base_seq` in
    /// serial order are treated as late.
    pub fn with_base(latency: Duration, base_seq: u16) -> Self {
        let mut jb = JitterBuffer::new(latency);
        jb.state = State::Buffering;
        jb.next_ext = EXTENDED_BASE + u64::from(base_seq);
        jb
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn stats(&self) -> &JitterBufferStats {
        &self.stats
    }

    /// Number of packets waiting for release.
    pub fn pending(&self) -> usize {
        self.store.len()
    }

    /// Stores a packet and releases every packet that is now in order or
    /// past its deadline. Empty payloads are padding and are discarded;
    /// duplicates and late arrivals are dropped and counted.
    pub fn insert(&mut self, packet: Packet, now: Instant) -> JitterBufferOutput {
        if packet.payload.is_empty() {
            self.stats.discarded_padding += 1;
            return self.finish(vec![], now);
        }
        self.stats.received += 1;

        let seq = packet.header.sequence_number;
        if self.state == State::Initial {
            self.state = State::Buffering;
            self.next_ext = EXTENDED_BASE + u64::from(seq);
        }

        // Serial arithmetic relative to the next expected sequence number:
        // anything half the space or more behind it is a late arrival.
        let delta = seq.wrapping_sub(self.next_ext as u16);
        if delta >= UINT16SIZE_HALF {
            self.stats.dropped_late += 1;
            return self.finish(vec![], now);
        }

        let ext = self.next_ext + u64::from(delta);
        if self.store.contains_key(&ext) {
            self.stats.dropped_duplicate += 1;
            return self.finish(vec![], now);
        }

        self.store.insert(ext, StoredPacket { packet, arrival: now });
        self.arrivals.push_back((ext, now));

        let mut packets = vec![];
        self.pop_releasable(now, &mut packets);
        self.finish(packets, now)
    }

    /// Handles an elapsed release deadline: the earliest pending packet is
    /// released unconditionally, then every packet that became contiguous or
    /// overdue follows.
    pub fn handle_timeout(&mut self, now: Instant) -> JitterBufferOutput {
        let mut packets = vec![];
        if let Some((ext, stored)) = self.store.pop_first() {
            self.next_ext = ext + 1;
            self.stats.released += 1;
            packets.push(stored.packet);
            self.pop_releasable(now, &mut packets);
        }
        self.finish(packets, now)
    }

    /// Drains every pending packet in sequence order and resets the buffer
    /// to its initial state. Flushing an empty buffer releases nothing.
    pub fn flush(&mut self) -> JitterBufferOutput {
        let packets: Vec<Packet> = std::mem::take(&mut self.store)
            .into_values()
            .map(|stored| stored.packet)
            .collect();
        self.stats.released += packets.len() as u64;
        self.arrivals.clear();
        self.next_ext = 0;
        self.state = State::Initial;

        JitterBufferOutput {
            packets,
            timeout: None,
        }
    }

    /// Releases the prefix of the store that is contiguous with the next
    /// expected sequence number or past its deadline.
    fn pop_releasable(&mut self, now: Instant, out: &mut Vec<Packet>) {
        loop {
            let releasable = match self.store.first_key_value() {
                Some((&ext, stored)) => {
                    ext == self.next_ext || stored.arrival + self.latency <= now
                }
                None => false,
            };
            if !releasable {
                break;
            }
            if let Some((ext, stored)) = self.store.pop_first() {
                self.next_ext = ext + 1;
                self.stats.released += 1;
                out.push(stored.packet);
            }
        }
    }

    /// The delay until the earliest pending packet reaches its deadline.
    fn next_timeout(&mut self, now: Instant) -> Option<Duration> {
        while let Some(&(ext, arrival)) = self.arrivals.front() {
            if self.store.contains_key(&ext) {
                let deadline = arrival + self.latency;
                return Some(deadline.saturating_duration_since(now));
            }
            // Released or dropped in the meantime.
            self.arrivals.pop_front();
        }
        None
    }

    fn finish(&mut self, packets: Vec<Packet>, now: Instant) -> JitterBufferOutput {
        let timeout = self.next_timeout(now);
        if self.state != State::Initial {
            self.state = if timeout.is_some() {
                State::TimerSet
            } else {
                State::Buffering
            };
        }
        JitterBufferOutput { packets, timeout }
    }
}
