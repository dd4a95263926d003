mod config;

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use crate::config::SemanticSearchConfig;
use crate::mail::Corpus;
use crate::search::SearchEngine;
use crate::semantic::hash::HashEmbedder;

pub const HASH_DIMENSIONS: usize = 512;

const CONTRACT: &str = "From: agent@sportsagency.example
To: contracts@arsenal.example
Subject: Contract renewal - Bukayo Saka Jr.
Date: Sun, 15 Jan 2040 10:30:00 +0000

Dear Arsenal Contracts Team,

We propose the following terms for Bukayo Saka Jr.
Weekly Wage: £250,000
Duration: 5 years
Signing Bonus: £5,000,000
Loyalty Bonus: £1,000,000
Last season he made 38 appearances and scored 21 goals.
";

const TRANSFER: &str = "From: scout@chelsea.example
To: director@chelsea.example
Subject: Transfer target - Gabriel Fernandez
Date: Mon, 20 Feb 2040 09:00:00 +0000

Gabriel Fernandez would arrive from Real Madrid
Transfer Fee: £85 million
The club expects a quick agreement.
";

const INJURY: &str = "From: medical@chelsea.example
To: manager@chelsea.example
Subject: Medical update - Reece James Jr.
Date: Tue, 06 Mar 2040 14:15:00 +0000

Reece James Jr. suffered a hamstring injury in training.
Expected return: 4 weeks.
";

const PERFORMANCE: &str = "From: analyst@liverpool.example
To: coach@liverpool.example
Subject: Season report - Mohamed Salah Jr.
Date: Sat, 28 Apr 2040 18:00:00 +0000

Mohamed Salah Jr. finished with 45 appearances, 30 goals and 12 assists.
";

/// A corpus of four readable messages plus files that must be skipped.
pub fn fixture_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    for folder in ["Arsenal", "Chelsea", "Liverpool"] {
        std::fs::create_dir_all(root.join(folder)).unwrap();
    }

    std::fs::write(root.join("Arsenal/email_001.msg"), CONTRACT).unwrap();
    std::fs::write(root.join("Chelsea/email_002.msg"), TRANSFER).unwrap();
    std::fs::write(root.join("Chelsea/email_003.msg"), INJURY).unwrap();
    std::fs::write(root.join("Liverpool/email_004.msg"), PERFORMANCE).unwrap();

    // not utf8
    std::fs::write(root.join("Liverpool/broken.msg"), [0xff, 0xfe, 0x00, 0x41]).unwrap();
    // wrong extension
    std::fs::write(root.join("Arsenal/notes.txt"), "Weekly Wage: £1").unwrap();

    dir
}

pub fn hash_config(cache: bool) -> SemanticSearchConfig {
    SemanticSearchConfig {
        model: "hash".to_string(),
        cache,
        ..Default::default()
    }
}

/// Engine over `emails_dir` with a download-free embedder and no vector cache.
pub fn hash_engine(emails_dir: &Path) -> SearchEngine {
    let corpus = Corpus::load(emails_dir, "msg").unwrap();
    SearchEngine::new(corpus, hash_config(false), emails_dir.join(".base"))
        .with_embedder(Arc::new(HashEmbedder::new(HASH_DIMENSIONS)))
}
