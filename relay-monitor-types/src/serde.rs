pub use ethereum_consensus::serde::as_str;

#[cfg(test)]
mod tests {
    use crate::types::{Bid, BidContext};

    #[test]
    fn test_fmt() {
        let context = BidContext::default();
        dbg!(&context);
        println!("{context}");

        let bid = Bid::default();
        dbg!(&bid);
    }
}
