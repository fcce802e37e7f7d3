//! Built-in text corpora: awkward personal names, a word list for word
//! salad, and a handful of longer passages.

/// Names that tend to break naive handling of people's names
pub const NAMES: &[&str] = &[
    "",
    "\u{a0}",
    "Nile Etland",
    "pookie",
    "Carson von Mekhan",
    "Sir Giles o' the Wold",
    "Harry James Potter-Evans-Verres",
    "Prince",
    "The Artist Formerly Known as Prince",
    "J. R. R. Tolkien",
    "Dr Who",
    "Dr. Zhivago",
    "Rev. Ezekiel Salem Furywright",
    "Richard M. Jones III, Esq.",
    "Pete",
    "Chargin' Chuck",
    "Football Charlie",
    "!!!",
    "Senor Cardgage",
    "Se\u{f1}nor Cardgage",
    "Senhor Cardgage",
    // table flip
    "Robert (\u{256f}\u{b0}\u{25a1}\u{b0}\u{ff09}\u{256f}\u{fe35} \u{253b}\u{2501}\u{253b})",
    "\u{5317}\u{65b9} \u{62d3}\u{8299}",
    "Bei-Fong Toph (\u{5317}\u{65b9} \u{62d3}\u{8299})",
    "Scott\u{10}Pilgrim",
    "Black\u{2606}Star",
    "justinbeiberfan69",
    "^-------@\0woo$",
    "Robert'); DROP TABLE Students;--",
    "a b c 1 2 3 lol butts lol @ u!!1",
    "\u{2606}\u{2606} Tom Swift \u{2606}\u{2606}",
    "\u{2606}\u{2606}\u{2606}\u{2606}",
    "Rupert \"Ripper\" Giles",
    "Jesse Ramsbotham",
    "e^(i*pi) = -1",
    "HARRRR",
    // outside the basic multilingual plane
    "Robert \u{10308} Smith",
    "\u{10308} \u{10308} Sleipnir McTavish \u{10308} \u{10308}",
    "Bob Dole",
    "bob dole",
    "  bob dole\t",
    "Bob\tdole",
    "Bob Dole <bdole@bob.co.nz> ",
];

/// Words joined at random to build word salad
pub const WORDS: &[&str] = &[
    "a",
    "and",
    "the",
    "of",
    "to",
    "in",
    "is",
    "it",
    "lighthouse",
    "keeper",
    "harbour",
    "kettle",
    "ledger",
    "marmalade",
    "quarrel",
    "orchard",
    "fennel",
    "gable",
    "whistle",
    "lantern",
    "drizzle",
    "pepper",
    "anvil",
    "cobbler",
    "thimble",
    "badger",
    "kite",
    "sprocket",
    "lemon",
    "glacier",
    "tide",
    "cardigan",
    "ferret",
    "runs",
    "sings",
    "forgets",
    "borrows",
    "quietly",
    "never",
    "sideways",
    "blue",
    "crooked",
    "enormous",
    "tiny",
    "NULL",
    "undefined",
    "0",
    "-1",
    "1e308",
    "%s",
    "{}",
    "<b>",
    "&amp;",
    "C:\\",
    "caf\u{e9}",
    "na\u{ef}ve",
    "\u{fc}ber",
    "stra\u{df}e",
    "\u{3b1}\u{3bb}\u{3c6}\u{3b1}",
    "\u{43f}\u{440}\u{438}\u{432}\u{435}\u{442}",
    "\u{65e5}\u{672c}",
    "\u{1f600}",
    "\u{202e}reversed",
    "zero\u{200b}width",
];

/// Longer authored passages, plain and accented prose
pub const PASSAGES: &[&str] = &[
    "The lighthouse keeper kept two ledgers: one for the ships that passed, \
     and one for the ships that only seemed to. By the end of the winter the \
     second ledger was the thicker of the two, and nobody in the harbour could \
     say which of them was the lie.",
    "Every morning the kettle sang a little flatter than the day before. The \
     cobbler swore it was the damp, his apprentice swore it was the kettle, \
     and the cat, who had opinions about both of them, swore nothing at all.",
    "Il \u{e9}tait une fois un verger o\u{f9} les pommes tombaient vers le \
     haut. Les enfants du village grimpaient aux arbres pour les rattraper, \
     et les vieux disaient que c'\u{e9}tait bien la preuve que le monde \
     tournait \u{e0} l'envers.",
    "Der Gl\u{e4}tscher bewegte sich so langsam, dass die Bergsteiger ihn f\u{fc}r \
     einen Felsen hielten. Erst als ihre Zelte am n\u{e4}chsten Morgen drei \
     Meter tiefer standen, begannen sie, der Landkarte zu misstrauen.",
    "She wrote her name in the margin, then crossed it out, then wrote it \
     again in smaller letters, as though the page might not notice the second \
     time. It did notice. Pages always do.",
    "\u{3a3}\u{3c4}\u{3bf} \u{3bb}\u{3b9}\u{3bc}\u{3ac}\u{3bd}\u{3b9} \u{3c4}\u{3b1} \
     \u{3ba}\u{3b1}\u{3c1}\u{3ac}\u{3b2}\u{3b9}\u{3b1} \u{3ad}\u{3c6}\u{3c5}\u{3b3}\u{3b1}\u{3bd} \
     \u{3bd}\u{3c9}\u{3c1}\u{3af}\u{3c2}, \u{3ba}\u{3b1}\u{3b9} \u{3bf} \u{3c6}\u{3ac}\u{3c1}\u{3bf}\u{3c2} \
     \u{3ad}\u{3bc}\u{3b5}\u{3b9}\u{3bd}\u{3b5} \u{3bc}\u{3cc}\u{3bd}\u{3bf}\u{3c2} \u{3bd}\u{3b1} \
     \u{3bc}\u{3b5}\u{3c4}\u{3c1}\u{3ac}\u{3b5}\u{3b9} \u{3c4}\u{3b1} \u{3ba}\u{3cd}\u{3bc}\u{3b1}\u{3c4}\u{3b1}.",
    "The committee met on Tuesday to discuss the agenda for the meeting at \
     which the committee would decide when to meet. Minutes were taken. The \
     minutes were later lost, which everyone agreed was for the best.",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpora_are_populated() {
        assert!(!NAMES.is_empty());
        assert!(!WORDS.is_empty());
        assert!(!PASSAGES.is_empty());
        assert_eq!(NAMES[0], "");
        assert!(NAMES.iter().any(|name| name.contains('\0')));
        assert!(NAMES.iter().any(|name| name.chars().any(|c| c as u32 > 0xffff)));
    }

    #[test]
    fn test_words_have_no_spaces() {
        assert!(WORDS.iter().all(|word| !word.is_empty() && !word.contains(' ')));
    }

    #[test]
    fn test_passages_are_long() {
        assert!(PASSAGES.iter().all(|passage| passage.chars().count() > 60));
    }
}
