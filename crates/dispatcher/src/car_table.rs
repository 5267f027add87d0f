// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The car registry and SCAN-style insertion-cost scheduler. One
//! `CarTable`, guarded by a single `RwLock`, stands in for `controller.c`'s
//! `cars[]` array plus its `cars_mutex` -- every table mutation, whether a
//! status update or a new call assignment, takes the same lock, which is
//! what keeps the scheduler's view of queues consistent with what each
//! car's writer task actually sends.

use std::collections::HashMap;

use tokio::sync::mpsc;

use elevator_proto::{Floor, Status};

/// Per-car state visible to the scheduler and to the car's own status
/// updates.
pub struct CarEntry {
    pub low: Floor,
    pub high: Floor,
    pub current_floor: Floor,
    pub status: Option<Status>,
    pub queue: Vec<Floor>,
    /// Encoded frames waiting to be written to this car's socket by its
    /// writer task. Sending never blocks the scheduler.
    pub outbox: mpsc::UnboundedSender<String>,
}

impl CarEntry {
    pub fn services(&self, floor: Floor) -> bool {
        floor.in_range(self.low, self.high)
    }

    /// The floor this car is effectively at for scheduling purposes: its
    /// last reported position, unless it is already moving toward the head
    /// of its own queue, in which case that head is the better estimate.
    fn effective_floor(&self) -> Floor {
        if !self.queue.is_empty()
            && matches!(self.status, Some(Status::Closing) | Some(Status::Between))
        {
            self.queue[0]
        } else {
            self.current_floor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
    Idle,
}

fn direction(from: i32, to: i32) -> Direction {
    if to > from {
        Direction::Up
    } else if to < from {
        Direction::Down
    } else {
        Direction::Idle
    }
}

/// The car registry, keyed by car name.
#[derive(Default)]
pub struct CarTable {
    pub cars: HashMap<String, CarEntry>,
}

impl CarTable {
    /// Assign a call to the best car, updating its queue and pushing a new
    /// `FLOOR` frame if the queue head changed. Returns the chosen car's
    /// name, or `None` if no registered car can service both floors.
    pub fn schedule(&mut self, source: Floor, dest: Floor) -> Option<String> {
        let mut best: Option<(String, usize, usize)> = None; // (name, cost, final_len)

        for (name, car) in self.cars.iter() {
            if !car.services(source) || !car.services(dest) {
                continue;
            }
            let (pickup_idx, final_len) = calculate_insertion_cost(
                &car.queue,
                car.effective_floor().as_int(),
                source.as_int(),
                dest.as_int(),
            );
            let better = match &best {
                None => true,
                Some((_, best_cost, best_len)) => {
                    pickup_idx < *best_cost || (pickup_idx == *best_cost && final_len < *best_len)
                }
            };
            if better {
                best = Some((name.clone(), pickup_idx, final_len));
            }
        }

        let (name, _, _) = best?;
        let car = self.cars.get_mut(&name).expect("name came from this table");
        let old_head = car.queue.first().copied();

        let (pickup_idx, _) =
            calculate_insertion_cost(&car.queue, car.effective_floor().as_int(), source.as_int(), dest.as_int());
        insert_into_queue(&mut car.queue, pickup_idx, source);

        if !car.queue.contains(&dest) {
            let travel_up = dest.as_int() > source.as_int();
            let mut dest_idx = car.queue.len();
            for (i, &floor) in car.queue.iter().enumerate().skip(pickup_idx + 1) {
                let reached = if travel_up { dest.as_int() < floor.as_int() } else { dest.as_int() > floor.as_int() };
                if reached {
                    dest_idx = i;
                    break;
                }
            }
            insert_into_queue(&mut car.queue, dest_idx, dest);
        }

        if car.queue.first().copied() != old_head {
            send_next_destination(car);
        }

        Some(name)
    }

    /// Apply a status report, dequeuing and advancing to the next
    /// destination if the car has just arrived at the head of its queue
    /// with its doors open or opening.
    pub fn apply_status(&mut self, name: &str, status: Status, current: Floor) {
        let Some(car) = self.cars.get_mut(name) else { return };
        car.current_floor = current;
        car.status = Some(status);

        if car.queue.first() == Some(&current) && matches!(status, Status::Open | Status::Opening) {
            car.queue.remove(0);
            send_next_destination(car);
        }
    }
}

fn send_next_destination(car: &CarEntry) {
    if let Some(&floor) = car.queue.first() {
        let _ = car.outbox.send(elevator_proto::Message::Floor { floor }.encode());
    }
}

/// Matches the original's fixed `queue[MAX_QUEUE_DEPTH]` array bound.
const MAX_QUEUE_DEPTH: usize = 20;

/// Insert `value` at `index`, skipping the insert if the queue is already
/// at capacity or if it would duplicate the entry immediately before it --
/// mirrors `insert_into_queue`'s bound check and dedup rule in the
/// original, which keeps a repeated pickup/drop-off floor from appearing
/// twice back to back.
fn insert_into_queue(queue: &mut Vec<Floor>, index: usize, value: Floor) {
    if queue.len() >= MAX_QUEUE_DEPTH || index > queue.len() {
        return;
    }
    if index > 0 && queue.get(index - 1) == Some(&value) {
        return;
    }
    queue.insert(index, value);
}

/// Find where a new pickup/drop-off pair can be inserted into `queue`
/// without ever requiring the car to reverse direction mid-run. Returns
/// `(pickup_idx, final_len)`; `final_len` is only meaningful as a
/// tie-breaker between equally-costed cars, mirroring
/// `calculate_insertion_cost` in the original.
fn calculate_insertion_cost(
    queue: &[Floor],
    effective_floor: i32,
    source: i32,
    dest: i32,
) -> (usize, usize) {
    let request_dir = direction(source, dest);
    let n = queue.len();
    let mut current = effective_floor;

    for i in 0..=n {
        let next = if i < n { queue[i].as_int() } else { current };
        let segment_dir = direction(current, next);
        let mut skip_extend = false;

        if segment_dir == request_dir {
            let can_pick_up = match request_dir {
                Direction::Up => source >= current && source < next,
                Direction::Down => source <= current && source > next,
                Direction::Idle => false,
            };
            if can_pick_up {
                for j in i..=n {
                    let check_next = if j < n { queue[j].as_int() } else { dest };
                    let reverses = match request_dir {
                        Direction::Up => check_next < source,
                        Direction::Down => check_next > source,
                        Direction::Idle => false,
                    };
                    if reverses {
                        skip_extend = true;
                        break;
                    }
                    let can_drop = j == n
                        || (request_dir == Direction::Up && dest <= check_next)
                        || (request_dir == Direction::Down && dest >= check_next);
                    if can_drop {
                        return (i, n + 2);
                    }
                }
            }
        }

        if !skip_extend && segment_dir != Direction::Idle && i < n {
            let next_segment_dir = if i + 1 < n { direction(next, queue[i + 1].as_int()) } else { Direction::Idle };

            if next_segment_dir != segment_dir && next_segment_dir != Direction::Idle {
                let extends_current_run = match segment_dir {
                    Direction::Up => source > next,
                    Direction::Down => source < next,
                    Direction::Idle => false,
                };
                if extends_current_run {
                    let dest_is_opposite = match segment_dir {
                        Direction::Up => dest < source,
                        Direction::Down => dest > source,
                        Direction::Idle => false,
                    };
                    if dest_is_opposite {
                        let check_dir = direction(source, dest);
                        let mut can_insert_dest = false;
                        for j in (i + 1)..=n {
                            let check_floor = if j < n { queue[j].as_int() } else { dest };
                            if check_dir == next_segment_dir {
                                let ok = match check_dir {
                                    Direction::Down => dest >= check_floor,
                                    Direction::Up => dest <= check_floor,
                                    Direction::Idle => false,
                                };
                                if ok {
                                    can_insert_dest = true;
                                    break;
                                }
                            }
                            if j == n {
                                can_insert_dest = true;
                                break;
                            }
                        }
                        if can_insert_dest {
                            return (i, n + 2);
                        }
                    }
                }
            }
        }

        current = next;
    }

    (n, n + 2)
}

#[cfg(test)]
#[path = "car_table_tests.rs"]
mod tests;
