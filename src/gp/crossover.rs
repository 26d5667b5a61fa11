//! Subtree crossover.
//!
//! Crossover picks one random subtree in each parent and splices the
//! donor's subtree in place of the receiver's. The packed preorder encoding
//! makes this three byte copies: receiver prefix, donor subtree, receiver
//! suffix.

use crate::gp::program::{Alphabet, Program};
use crate::gp::rng::Lcg48;

/// Half-open byte range of one subtree.
#[derive(Debug, Clone, Copy)]
struct Subtree {
    begin: usize,
    end: usize,
}

impl Subtree {
    /// Draw a uniform subtree of `program` (every offset in `[0, len)`
    /// starts exactly one node).
    fn draw(program: &Program, alphabet: &Alphabet, len: usize, rng: &mut Lcg48) -> Self {
        let begin = rng.below(len);
        let end = program.skip(alphabet, begin);
        Self { begin, end }
    }

    fn len(self) -> usize {
        self.end - self.begin
    }
}

/// Cross two parents into `out`, which must have the run's program capacity.
///
/// Two subtrees are drawn, one per parent, consuming exactly two random
/// draws. The composition `a[..sa.begin] ++ b[sb] ++ a[sa.end..]` is used if
/// its length stays strictly below capacity; otherwise the roles of the
/// parents are swapped and the symmetric composition is tried with the same
/// two subtrees. Returns `false` when neither composition fits, in which
/// case `out` is untouched and the caller falls back to copy-and-mutate.
pub fn crossover(
    a: &Program,
    b: &Program,
    alphabet: &Alphabet,
    rng: &mut Lcg48,
    out: &mut Program,
) -> bool {
    let len_a = a.len(alphabet);
    let len_b = b.len(alphabet);

    let sub_a = Subtree::draw(a, alphabet, len_a, rng);
    let sub_b = Subtree::draw(b, alphabet, len_b, rng);

    let direct = sub_a.begin + sub_b.len() + (len_a - sub_a.end);
    let swapped = sub_b.begin + sub_a.len() + (len_b - sub_b.end);

    if direct < out.capacity() {
        splice(a, len_a, sub_a, b, sub_b, out);
        true
    } else if swapped < out.capacity() {
        splice(b, len_b, sub_b, a, sub_a, out);
        true
    } else {
        false
    }
}

/// Write `receiver` with `donor`'s subtree in place of its own into `out`.
fn splice(
    receiver: &Program,
    receiver_len: usize,
    cut: Subtree,
    donor: &Program,
    graft: Subtree,
    out: &mut Program,
) {
    let receiver_bytes = receiver.as_bytes();
    let donor_bytes = donor.as_bytes();
    let out_bytes = out.bytes_mut();

    out_bytes[..cut.begin].copy_from_slice(&receiver_bytes[..cut.begin]);
    out_bytes[cut.begin..cut.begin + graft.len()]
        .copy_from_slice(&donor_bytes[graft.begin..graft.end]);

    let tail = cut.begin + graft.len();
    let suffix = &receiver_bytes[cut.end..receiver_len];
    out_bytes[tail..tail + suffix.len()].copy_from_slice(suffix);
}
