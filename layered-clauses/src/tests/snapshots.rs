//! Snapshot renderings of full decompositions.

use crate::SlotDecomposer;
use layered_slots::{ParsedSentence, SlotLineDisplay};

fn test_setup(conll: &str) -> String {
    let sentence = ParsedSentence::from_conll(conll).unwrap();
    let decomposition = SlotDecomposer::default().decompose(&sentence).unwrap();
    SlotLineDisplay::new(&sentence)
        .with(&decomposition.slots)
        .to_string()
}

#[test]
fn test_relative_clause_object() {
    let display = test_setup(
        "1 I I PRON 2 nsubj
         2 read read VERB 0 ROOT
         3 the the DET 4 det
         4 book book NOUN 2 dobj
         5 that that PRON 7 dobj
         6 she she PRON 7 nsubj
         7 wrote write VERB 4 relcl",
    );

    insta::assert_snapshot!(display, @r###"
    I  read  the  book  that  she  wrote
    ╰S: "I"
       ╰──╯V: "read"
             ╰─────────────────────────╯O1: ""
                              ╰─╯sub-o1.S: "she"
                                   ╰───╯sub-o1.V: "wrote"
             ╰─────────────╯sub-o1.O1: "the book that"
    "###);
}

#[test]
fn test_passive_with_agent() {
    let display = test_setup(
        "1 The the DET 2 det
         2 book book NOUN 4 nsubjpass
         3 was be AUX 4 auxpass
         4 written write VERB 0 ROOT
         5 by by ADP 4 agent
         6 her she PRON 5 pobj",
    );

    insta::assert_snapshot!(display, @r###"
    The  book  was  written  by  her
    ╰───────╯S: "The book"
               ╰─╯Aux: "was"
                    ╰─────╯V: "written"
                             ╰─────╯M3: "by her"
    "###);
}

#[test]
fn test_adverbial_clause() {
    let display = test_setup(
        "1 She she PRON 2 nsubj
         2 left leave VERB 0 ROOT
         3 because because SCONJ 5 mark
         4 he he PRON 5 nsubj
         5 arrived arrive VERB 2 advcl",
    );

    insta::assert_snapshot!(display, @r###"
    She  left  because  he  arrived
    ╰─╯S: "She"
         ╰──╯V: "left"
               ╰──────────────────╯M3: ""
                        ╰╯sub-m3.S: "he"
                            ╰─────╯sub-m3.V: "arrived"
               ╰─────╯sub-m3.M1: "because"
    "###);
}
