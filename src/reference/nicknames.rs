//! Nicknames used when decorating given names

use rustc_hash::FxHashMap;

const BUILTIN_NICKNAMES: &[(&str, &[&str])] = &[
    ("ALEXANDER", &["ALEX", "XANDER", "SANDY"]),
    ("ANTHONY", &["TONY"]),
    ("BENJAMIN", &["BEN", "BENNY"]),
    ("CHRISTOPHER", &["CHRIS", "KIT"]),
    ("DANIEL", &["DAN", "DANNY"]),
    ("DEBORAH", &["DEB", "DEBBIE"]),
    ("EDWARD", &["ED", "EDDIE", "TED"]),
    ("ELIZABETH", &["LIZ", "BETH", "BETTY", "LIZZIE"]),
    ("JAMES", &["JIM", "JIMMY", "JAMIE"]),
    ("JENNIFER", &["JEN", "JENNY"]),
    ("JOHN", &["JACK", "JOHNNY"]),
    ("JOSEPH", &["JOE", "JOEY"]),
    ("KATHERINE", &["KATE", "KATH", "KATIE"]),
    ("MARGARET", &["MAGGIE", "MEG", "PEG"]),
    ("MATTHEW", &["MATT"]),
    ("MICHAEL", &["MIKE", "MICK"]),
    ("NICHOLAS", &["NICK"]),
    ("PATRICIA", &["PAT", "TRISH"]),
    ("REBECCA", &["BEC", "BECKY"]),
    ("RICHARD", &["RICK", "RICH", "DICK"]),
    ("ROBERT", &["BOB", "ROB", "BOBBY"]),
    ("SAMUEL", &["SAM"]),
    ("SUSAN", &["SUE", "SUSIE"]),
    ("THOMAS", &["TOM", "TOMMY"]),
    ("VICTORIA", &["VICKY", "TORI"]),
    ("WILLIAM", &["BILL", "WILL", "BILLY", "LIAM"]),
];

/// Given name to nickname lookup, keyed by upper-case name
#[derive(Debug, Clone, Default)]
pub struct Nicknames {
    map: FxHashMap<String, Vec<String>>,
}

impl Nicknames {
    /// The built-in nickname table
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_pairs(BUILTIN_NICKNAMES.iter().flat_map(|(name, nicks)| {
            nicks
                .iter()
                .map(move |nick| ((*name).to_string(), (*nick).to_string()))
        }))
    }

    /// Build from `(given name, nickname)` pairs
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut map: FxHashMap<String, Vec<String>> = FxHashMap::default();
        for (name, nick) in pairs {
            let nick = nick.trim().to_uppercase();
            if nick.is_empty() {
                continue;
            }
            map.entry(name.trim().to_uppercase()).or_default().push(nick);
        }
        Self { map }
    }

    /// Nicknames for a given name
    #[must_use]
    pub fn lookup(&self, given_name: &str) -> Option<&[String]> {
        self.map
            .get(given_name.trim().to_uppercase().as_str())
            .filter(|nicks| !nicks.is_empty())
            .map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
