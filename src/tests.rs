//! End-to-end scenarios: known deals, small endings against brute force,
//! and consistency between the solve modes

use super::*;
use crate::types::{bit_map_rank, hand_id, is_ns, suit_name, ACE, KING, QUEEN, TWO};

/// Tricks for North-South with West on lead, strains in table order NT S H D C
struct KnownDeal {
    name: &'static str,
    pbn: &'static str,
    ns_tricks: [i32; 5],
}

const KNOWN_DEALS: &[KnownDeal] = &[
    KnownDeal { name: "deal.01", pbn: "N:J75.AQT86.J.AK95 92.KJ92.T985.Q72 AKQ864.53.Q42.T3 T3.74.AK763.J864", ns_tricks: [9, 11, 8, 6, 7] },
    KnownDeal { name: "deal.02", pbn: "N:AT3.T82.AQJ96.76 KQ98754.A.54.T82 62.Q953.T832.AJ4 J.KJ764.K7.KQ953", ns_tricks: [7, 4, 6, 8, 4] },
    KnownDeal { name: "deal.03", pbn: "N:A72.962.KT543.T2 T986.QT3.98.K863 Q54.AJ754.A7.Q94 KJ3.K8.QJ62.AJ75", ns_tricks: [5, 5, 8, 7, 4] },
    KnownDeal { name: "deal.04", pbn: "N:Q7652.T54.9642.A AJ9.J732.K3.JT86 KT3.A986.AQT8.43 84.KQ.J75.KQ9752", ns_tricks: [5, 9, 8, 10, 5] },
    KnownDeal { name: "deal.05", pbn: "N:752.J7.JT.AQT832 94.KT842.832.KJ9 KQT63.AQ95.65.54 AJ8.63.AKQ974.76", ns_tricks: [4, 7, 6, 3, 7] },
    KnownDeal { name: "deal.06", pbn: "N:KT.AKJ83.KQT73.Q AJ7.QT754.42.985 86543.-.J95.AJT32 Q92.962.A86.K764", ns_tricks: [7, 8, 7, 10, 7] },
    KnownDeal { name: "deal.07", pbn: "N:AQJ52.A953.Q42.Q T6.J76.-.AKJT9865 K984.KT8.K983.43 73.Q42.AJT765.72", ns_tricks: [4, 9, 9, 8, 4] },
    KnownDeal { name: "deal.08", pbn: "N:Q5.JT6.AQJ96.954 K842.752.85.KJT7 J63.KQ843.743.A3 AT97.A9.KT2.Q862", ns_tricks: [7, 5, 9, 9, 5] },
    KnownDeal { name: "deal.09", pbn: "N:J.J74.KJ8762.Q82 A532.952.953.J96 8764.AT8.A.AT753 KQT9.KQ63.QT4.K4", ns_tricks: [7, 6, 6, 9, 8] },
    KnownDeal { name: "deal.10", pbn: "N:643.75.63.AJT432 T2.J862.KQ9754.8 KQJ95.T9.A82.Q96 A87.AKQ43.JT.K75", ns_tricks: [7, 8, 2, 2, 9] },
    KnownDeal { name: "deal.11", pbn: "N:43.A3.KJT987.AJ4 5.J9865.5.KQ9752 QT62.KQ.A64.T863 AKJ987.T742.Q32.-", ns_tricks: [9, 6, 3, 9, 7] },
    KnownDeal { name: "deal.12", pbn: "N:AJ742.KT54.3.A95 KQT963.98.754.JT -.AQ632.KT2.Q8764 85.J7.AQJ986.K32", ns_tricks: [8, 6, 11, 5, 11] },
    KnownDeal { name: "deal.13", pbn: "N:KT98.AQJ73.K5.82 AQ642.862.T92.93 53.95.Q864.AJ764 J7.KT4.AJ73.KQT5", ns_tricks: [7, 6, 8, 5, 7] },
    KnownDeal { name: "deal.14", pbn: "N:QT32.Q92.T.A9852 A75.JT3.943.KJT6 K984.A765.AQ76.4 J6.K84.KJ852.Q73", ns_tricks: [7, 9, 9, 7, 7] },
    KnownDeal { name: "deal.15", pbn: "N:Q83.53.94.AKQJT7 A64.KJ92.A82.964 T952.T8.KQT5.853 KJ7.AQ764.J763.2", ns_tricks: [5, 6, 3, 5, 8] },
    KnownDeal { name: "deal.16", pbn: "N:K97.KJ4.K96.KJ96 AJT82.Q32.T3.Q53 4.T98.A8752.8742 Q653.A765.QJ4.AT", ns_tricks: [4, 3, 4, 7, 7] },
    KnownDeal { name: "deal.17", pbn: "N:965.6.QT875.KQJ6 T84.AT42.AJ9.742 KQJ7.K953.K62.A8 A32.QJ87.43.T953", ns_tricks: [8, 9, 7, 9, 9] },
    KnownDeal { name: "deal.18", pbn: "N:QT764.AQ6.Q54.J3 98.KT32.J82.K942 A53.87.AT963.Q65 KJ2.J954.K7.AT87", ns_tricks: [6, 8, 4, 8, 4] },
    KnownDeal { name: "deal.19", pbn: "N:Q97632.A87.J4.Q7 -.KJT94.AQ93.J654 KT8.Q63.KT87.KT8 AJ54.52.652.A932", ns_tricks: [8, 8, 6, 6, 4] },
    KnownDeal { name: "deal.20", pbn: "N:2.A765.AKT964.A4 J75.T942.QJ82.63 QT3.KJ3.5.KT9852 AK9864.Q8.73.QJ7", ns_tricks: [8, 7, 10, 10, 11] },
    KnownDeal { name: "deal.21", pbn: "N:J82.9.AK42.KQT86 AQ5.A6543.85.A97 KT4.KJ82.J97.J32 9763.QT7.QT63.54", ns_tricks: [9, 8, 7, 9, 10] },
    KnownDeal { name: "deal.22", pbn: "N:J4.A985.Q9854.KT QT6.43.AKJT3.J42 A752.KQJ7.76.A96 K983.T62.2.Q8753", ns_tricks: [7, 6, 9, 7, 5] },
    KnownDeal { name: "deal.23", pbn: "N:Q832.KQJ5.853.97 J96.T8642.-.AQT32 5.3.AKJ9762.J654 AKT74.A97.QT4.K8", ns_tricks: [4, 3, 3, 7, 4] },
    KnownDeal { name: "deal.24", pbn: "N:K75.KQ64.QJ75.65 8643.J8.AT64.T84 AT9.A7532.K98.K7 QJ2.T9.32.AQJ932", ns_tricks: [6, 8, 10, 9, 5] },
    KnownDeal { name: "deal.25", pbn: "N:J643.J3.JT5.Q652 A72.Q864.Q73.KT3 Q985.92.K2.AJ874 KT.AKT75.A9864.9", ns_tricks: [2, 7, 2, 2, 6] },
];

const PBN: &str = "N:AKQT3.J6.KJ42.95 652.AK42.AQ87.T4 J74.QT95.T.AK863 98.873.9653.QJ72";

fn small_config() -> SolverConfig {
    SolverConfig::with_tt_kind(TtKind::Small)
}

fn configs() -> Vec<SolverConfig> {
    let plain = SolverConfig {
        options: SearchOptions::plain(),
        ..small_config()
    };
    vec![small_config(), SolverConfig::with_tt_kind(TtKind::Large), plain]
}

/// Small deterministic generator for random endings
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }
}

/// Deal `per_hand` random cards to each seat
fn random_ending(rng: &mut XorShift, per_hand: usize) -> Hands {
    let mut deck: Vec<(Suit, Rank)> = (0..NUM_SUITS)
        .flat_map(|suit| (TWO..=ACE).map(move |rank| (suit, rank)))
        .collect();
    for i in (1..deck.len()).rev() {
        let j = (rng.next() % (i as u64 + 1)) as usize;
        deck.swap(i, j);
    }
    let mut hands = Hands::new();
    for (i, &(suit, rank)) in deck.iter().take(per_hand * NUM_SEATS).enumerate() {
        hands.holding_mut(i % NUM_SEATS, suit).add(rank);
    }
    hands
}

/// North-South tricks by full minimax from a trick in progress
fn brute_force_ns(hands: &mut Hands, trump: usize, leader: Seat, trick: &mut Vec<(Suit, Rank)>) -> i32 {
    if trick.len() == NUM_SEATS {
        let mut best = 0;
        for i in 1..NUM_SEATS {
            let (suit, rank) = trick[i];
            let (best_suit, best_rank) = trick[best];
            if (suit == best_suit && rank > best_rank) || (suit != best_suit && suit == trump) {
                best = i;
            }
        }
        let winner = hand_id(leader, best);
        let won = is_ns(winner) as i32;
        if hands.total_cards() == 0 {
            return won;
        }
        return won + brute_force_ns(hands, trump, winner, &mut Vec::new());
    }

    let seat = hand_id(leader, trick.len());
    let follows = trick
        .first()
        .map(|&(lead_suit, _)| lead_suit)
        .filter(|&lead_suit| !hands.holding(seat, lead_suit).is_empty());
    let mut cards = Vec::new();
    for suit in 0..NUM_SUITS {
        if follows.map_or(true, |lead_suit| lead_suit == suit) {
            cards.extend(hands.holding(seat, suit).iter().map(|rank| (suit, rank)));
        }
    }

    let maximize = is_ns(seat);
    let mut best = if maximize { i32::MIN } else { i32::MAX };
    for (suit, rank) in cards {
        hands.holding_mut(seat, suit).remove(rank);
        trick.push((suit, rank));
        let value = brute_force_ns(hands, trump, leader, trick);
        trick.pop();
        hands.holding_mut(seat, suit).add(rank);
        best = if maximize { best.max(value) } else { best.min(value) };
    }
    best
}

/// Tricks for the side to play, by brute force
fn brute_force_score(hands: &Hands, trump: usize, leader: Seat, played: &[(Suit, Rank)]) -> i32 {
    let mut trick = played.to_vec();
    let mut hands = *hands;
    let ns = brute_force_ns(&mut hands, trump, leader, &mut trick);
    let total = (hands.total_cards() + played.len()).div_ceil(NUM_SEATS) as i32;
    if is_ns(hand_id(leader, played.len())) {
        ns
    } else {
        total - ns
    }
}

#[test]
fn test_last_trick() {
    let mut slot = SolveSlot::new(&small_config());
    // West ruffs North's ace
    let deal = Deal::from_pbn("N:A... 2... 3... .2..", HEART, NORTH).unwrap();
    let fut = slot.solve_board(&deal, -1, 1, 1).unwrap();
    assert_eq!(fut.cards, 1);
    assert_eq!((fut.suit[0], fut.rank[0], fut.score[0]), (SPADE, ACE, 0));

    let deal = Deal::from_pbn("N:A... 2... 3... .2..", NOTRUMP, NORTH).unwrap();
    let fut = slot.solve_board(&deal, -1, 1, 1).unwrap();
    assert_eq!(fut.score[0], 1);
}

#[test]
fn test_cold_grand_slam() {
    let mut slot = SolveSlot::new(&small_config());
    let pbn = "N:AKQJ.AKQ.AKQ.AKQ T987.JT9.JT9.JT9 6543.876.876.876 2.5432.5432.5432";
    let deal = Deal::from_pbn(pbn, NOTRUMP, WEST).unwrap();
    let fut = slot.solve_board(&deal, -1, 1, 1).unwrap();
    // West takes nothing against 13 top tricks
    assert_eq!(fut.score[0], 0);

    let deal = Deal::from_pbn(pbn, NOTRUMP, NORTH).unwrap();
    let fut = slot.solve_board(&deal, -1, 1, 1).unwrap();
    assert_eq!(fut.score[0], 13);
    let fut = slot.solve_board(&deal, 13, 2, 1).unwrap();
    assert_eq!(fut.score[0], 13);
    assert!(fut.cards >= 1);
}

#[test]
fn test_endings_match_brute_force() {
    let mut rng = XorShift(0x9e37_79b9_7f4a_7c15);
    let mut cases = Vec::new();
    for round in 0..12 {
        let hands = random_ending(&mut rng, 2 + round % 3);
        let trump = round % 5;
        for leader in [NORTH, EAST, SOUTH, WEST] {
            cases.push((hands, trump, leader, brute_force_score(&hands, trump, leader, &[])));
        }
    }

    for config in configs() {
        let mut slot = SolveSlot::new(&config);
        for &(hands, trump, leader, expected) in &cases {
            let deal = Deal::new(&hands, trump, leader);
            let fut = slot.solve_board(&deal, -1, 1, 1).unwrap();
            assert_eq!(
                fut.score[0],
                expected,
                "{} trump {} leader {}",
                hands.to_pbn(NORTH),
                trump,
                leader
            );
        }
    }
}

#[test]
fn test_mid_trick_matches_brute_force() {
    let mut rng = XorShift(0x2545_f491_4f6c_dd1d);
    let mut slot = SolveSlot::new(&small_config());
    for round in 0..10 {
        let mut hands = random_ending(&mut rng, 3);
        let trump = round % 5;
        let leader = round % NUM_SEATS;
        // Lead the leader's first card, follow with the next hand's first card
        let mut played = Vec::new();
        for rel in 0..(1 + round % 3) {
            let seat = hand_id(leader, rel);
            let lead_suit = played.first().map(|&(s, _): &(Suit, Rank)| s);
            let suit = lead_suit
                .filter(|&s| !hands.holding(seat, s).is_empty())
                .or_else(|| (0..NUM_SUITS).find(|&s| !hands.holding(seat, s).is_empty()))
                .unwrap();
            let rank = hands.holding(seat, suit).bottom();
            hands.holding_mut(seat, suit).remove(rank);
            played.push((suit, rank));
        }
        let deal = Deal::with_trick(&hands, trump, leader, &played);
        let fut = slot.solve_board(&deal, -1, 1, 1).unwrap();
        assert_eq!(fut.score[0], brute_force_score(&hands, trump, leader, &played));
    }
}

#[test]
fn test_suit_relabel_keeps_results() {
    let mut rng = XorShift(0xdead_beef_cafe_f00d);
    let mut slot = SolveSlot::new(&small_config());
    for _ in 0..6 {
        let hands = random_ending(&mut rng, 4);
        let swapped = hands.swap_suits(SPADE, DIAMOND);
        for (trump, swapped_trump) in [(SPADE, DIAMOND), (HEART, HEART), (NOTRUMP, NOTRUMP)] {
            let a = slot
                .solve_board(&Deal::new(&hands, trump, WEST), -1, 1, 1)
                .unwrap();
            let b = slot
                .solve_board(&Deal::new(&swapped, swapped_trump, WEST), -1, 1, 1)
                .unwrap();
            assert_eq!(a.score[0], b.score[0]);
        }
    }
}

#[test]
fn test_all_card_scores_match_forced_leads() {
    let mut rng = XorShift(0x0123_4567_89ab_cdef);
    let mut slot = SolveSlot::new(&small_config());
    for round in 0..4 {
        let hands = random_ending(&mut rng, 4);
        let trump = (round * 2) % 5;
        let leader = round % NUM_SEATS;
        let deal = Deal::new(&hands, trump, leader);
        let all = slot.solve_board(&deal, -1, 3, 1).unwrap();
        let best = slot.solve_board(&deal, -1, 1, 1).unwrap();
        assert_eq!(all.best_score(), Some(best.score[0]));

        // Scores come back best first
        let scores: Vec<i32> = all.scored_cards().map(|c| c.score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));

        let total = hands.num_tricks() as i32;
        for card in all.scored_cards() {
            let mut rest = hands;
            rest.holding_mut(leader, card.suit).remove(card.rank);
            let after = Deal::with_trick(&rest, trump, leader, &[(card.suit, card.rank)]);
            let reply = slot.solve_board(&after, -1, 1, 1).unwrap();
            assert_eq!(card.score, total - reply.score[0], "lead {}", card);
        }
    }
}

#[test]
fn test_all_optimal_cards() {
    let mut slot = SolveSlot::new(&small_config());
    // Any spade wins every trick for North
    let deal = Deal::from_pbn("N:AKQ... 432... JT9... 876...", NOTRUMP, NORTH).unwrap();
    let fut = slot.solve_board(&deal, -1, 2, 1).unwrap();
    assert_eq!(fut.score[0], 3);
    // The spades form one sequence, reported once with its equals
    assert_eq!(fut.cards, 1);
    assert_eq!(fut.rank[0], ACE);
    assert_eq!(fut.equals[0], (1 << KING) | (1 << QUEEN));
}

#[test]
fn test_target_mode() {
    let mut slot = SolveSlot::new(&small_config());
    let deal = Deal::from_pbn("N:AQ... KJ... 32... .43..", NOTRUMP, NORTH).unwrap();
    let fut = slot.solve_board(&deal, 1, 1, 1).unwrap();
    assert_eq!((fut.cards, fut.score[0]), (1, 1));
    let fut = slot.solve_board(&deal, 2, 1, 1).unwrap();
    assert_eq!((fut.cards, fut.score[0]), (0, -1));
}

#[test]
fn test_similar_deals_reuse_table() {
    let mut slot = SolveSlot::new(&small_config());
    let mut rng = XorShift(0x5851_f42d_4c95_7f2d);
    let hands = random_ending(&mut rng, 6);
    slot.calc_dd_table(&hands).unwrap();
    let stats = slot.stats();
    assert!(stats.tt.hits > 0);
    assert!(stats.tt.adds > 0);
    // One reset per strain change, none per leader
    assert_eq!(stats.tt.total_resets(), 5);
    assert_eq!(stats.solves, 20);
}

#[test]
fn test_results_independent_of_history() {
    let mut rng = XorShift(0x1405_7b7e_f767_814f);
    let boards: Vec<Board> = (0..8)
        .map(|i| Board::best_card(Deal::new(&random_ending(&mut rng, 4), i % 5, i % 4)))
        .collect();
    let mut reused = SolveSlot::new(&small_config());
    for board in &boards {
        let mut fresh = SolveSlot::new(&small_config());
        let a = fresh.solve_board(&board.deal, -1, 1, 1).unwrap();
        let b = reused.solve_board(&board.deal, -1, 1, 1).unwrap();
        assert_eq!(a.score[0], b.score[0]);
    }
}

#[test]
fn test_leaders_in_sequence_share_one_table() {
    // A trick winner standing for a run of equal cards has to keep the run
    // inside the stored pattern, or a later leader reads a wrong bound
    let pbn = "N:4.A2.85.AK84 JT9.K76.Q.JT AQ6.95.4.976 K75.J4.J9.52";
    for config in configs() {
        let mut shared = SolveSlot::new(&config);
        for (i, leader) in [EAST, WEST, NORTH, SOUTH].into_iter().enumerate() {
            let deal = Deal::from_pbn(pbn, SPADE, leader).unwrap();
            let mode = if i == 0 { 1 } else { 2 };
            let reused = shared.solve_board(&deal, -1, 1, mode).unwrap();
            let fresh = SolveSlot::new(&config).solve_board(&deal, -1, 1, 1).unwrap();
            assert_eq!(reused.score[0], fresh.score[0], "leader {}", leader);
        }
    }
}

#[test]
fn test_shared_table_matches_brute_force() {
    let mut rng = XorShift(0x6a09_e667_f3bc_c908);
    let mut cases = Vec::new();
    for round in 0..10 {
        let hands = random_ending(&mut rng, 3 + round % 2);
        let trump = round % 5;
        let expected: Vec<i32> = (0..NUM_SEATS)
            .map(|leader| brute_force_score(&hands, trump, leader, &[]))
            .collect();
        cases.push((hands, trump, expected));
    }

    for config in configs() {
        for (hands, trump, expected) in &cases {
            let mut slot = SolveSlot::new(&config);
            for leader in [EAST, WEST, NORTH, SOUTH] {
                let deal = Deal::new(hands, *trump, leader);
                let mode = if leader == EAST { 1 } else { 2 };
                let fut = slot.solve_board(&deal, -1, 1, mode).unwrap();
                assert_eq!(
                    fut.score[0],
                    expected[leader],
                    "{} trump {} leader {}",
                    hands.to_pbn(NORTH),
                    trump,
                    leader
                );
            }
        }
    }
}

#[test]
fn test_later_trick_verdicts_match_brute_force() {
    use crate::later_tricks::{later_tricks_max, later_tricks_min};
    use crate::position::Position;

    let mut rng = XorShift(0xbb67_ae85_84ca_a73b);
    let mut verdicts = 0;
    for round in 0..40 {
        let per_hand = 2 + round % 3;
        let hands = random_ending(&mut rng, per_hand);
        let mut holdings = [[0u16; NUM_SUITS]; NUM_SEATS];
        for (seat, row) in holdings.iter_mut().enumerate() {
            for (suit, bits) in row.iter_mut().enumerate() {
                *bits = hands.holding(seat, suit).bits();
            }
        }
        let depth = 4 * (per_hand - 1);

        for trump in 0..=NOTRUMP {
            for leader in 0..NUM_SEATS {
                let ns = brute_force_score(&hands, trump, leader, &[]);
                let ns = if is_ns(leader) { ns } else { per_hand as i32 - ns };
                for max_is_ns in [true, false] {
                    let max_tricks = if max_is_ns { ns } else { per_hand as i32 - ns };
                    for target in 1..=per_hand as i32 {
                        let mut pos = Position::new(&holdings, leader);
                        let verdict = if is_ns(leader) == max_is_ns {
                            later_tricks_min(&mut pos, leader, depth, target, trump, max_is_ns)
                        } else {
                            later_tricks_max(&mut pos, leader, depth, target, trump, max_is_ns)
                        };
                        if let Some(reached) = verdict {
                            verdicts += 1;
                            assert_eq!(
                                reached,
                                max_tricks >= target,
                                "{} trump {} leader {} target {}",
                                hands.to_pbn(NORTH),
                                trump,
                                leader,
                                target
                            );
                        }
                    }
                }
            }
        }
    }
    assert!(verdicts > 0);
}

#[test]
fn test_error_codes() {
    let mut slot = SolveSlot::new(&small_config());
    let deal = Deal::from_pbn(PBN, NOTRUMP, WEST).unwrap();
    let err = slot.solve_board(&deal, 14, 1, 1).unwrap_err();
    assert_eq!(err.code(), -7);
    let mut short = deal;
    short.remain_cards[EAST][SPADE] &= !(1 << 5);
    assert_eq!(slot.solve_board(&short, -1, 1, 1).unwrap_err().code(), -14);
    let mut dup = deal;
    dup.remain_cards[EAST][SPADE] |= 1 << ACE;
    dup.remain_cards[EAST][SPADE] &= !(1 << 5);
    assert_eq!(slot.solve_board(&dup, -1, 1, 1).unwrap_err().code(), -4);
}

#[test]
fn test_batch_tables() {
    let mut rng = XorShift(0x3c6e_f372_fe94_f82b);
    let deals: Vec<Hands> = (0..4).map(|_| random_ending(&mut rng, 3)).collect();
    let config = SolverConfig {
        threads: 2,
        ..small_config()
    };
    let tables = calc_all_tables(&deals, &config).unwrap();
    for (hands, table) in deals.iter().zip(&tables) {
        for strain in TABLE_STRAINS {
            for declarer in TABLE_DECLARERS {
                let leader = (declarer + 1) % NUM_SEATS;
                let leader_side = brute_force_score(hands, strain, leader, &[]);
                assert_eq!(table.tricks(strain, declarer), 3 - leader_side);
            }
        }
    }
}

#[test]
#[ignore] // Slow: five full-deal tables
fn test_first_deal_table() {
    let hands = Hands::from_pbn(PBN).unwrap();
    let mut slot = SolveSlot::new(&SolverConfig::default());
    let table = slot.calc_dd_table(&hands).unwrap();
    // South declares when West leads
    let expected = [(NOTRUMP, 9), (SPADE, 10), (HEART, 8), (DIAMOND, 7), (CLUB, 8)];
    for (strain, tricks) in expected {
        assert_eq!(table.tricks(strain, SOUTH), tricks, "{}", suit_name(strain));
    }
    assert_eq!(table.tricks(NOTRUMP, NORTH), 9);
}

#[test]
#[ignore] // Slow: runs the full table of every known deal
fn test_known_deal_tables() {
    let deals: Vec<Hands> = KNOWN_DEALS
        .iter()
        .map(|d| Hands::from_pbn(d.pbn).unwrap_or_else(|| panic!("cannot parse {}", d.name)))
        .collect();
    let tables = calc_all_tables(&deals, &SolverConfig::default()).unwrap();
    for (known, table) in KNOWN_DEALS.iter().zip(&tables) {
        for (i, strain) in TABLE_STRAINS.into_iter().enumerate() {
            assert_eq!(
                table.tricks(strain, SOUTH),
                known.ns_tricks[i],
                "{} {}",
                known.name,
                suit_name(strain)
            );
        }
    }
}

#[test]
#[ignore] // Slow: full deal with every lead scored
fn test_opening_leads_scored() {
    let deal = Deal::from_pbn(PBN, NOTRUMP, WEST).unwrap();
    let mut slot = SolveSlot::new(&SolverConfig::default());
    let fut = slot.solve_board(&deal, -1, 3, 1).unwrap();
    // West's side takes four tricks against 3NT-plus
    assert_eq!(fut.best_score(), Some(4));
    let ranks: u32 = fut.scored_cards().map(|c| 1 + c.equal_ranks().size() as u32).sum();
    assert_eq!(ranks, 13);
}

#[test]
fn test_hands_parsing() {
    let hands = Hands::from_pbn(PBN).unwrap();
    for seat in [NORTH, EAST, SOUTH, WEST] {
        assert_eq!(hands.num_cards(seat), 13);
    }
    assert_eq!(hands.total_cards(), 52);
    assert_eq!(hands.holding(NORTH, SPADE).bits() & bit_map_rank(ACE), bit_map_rank(ACE));
}
