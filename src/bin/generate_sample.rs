use rusty_survey::data::schema::Column;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }

    fn chance(&mut self, percent: usize) -> bool {
        self.below(100) < percent
    }
}

/// District → upazillas → unions; villages are generated per union.
const LOCATIONS: &[(&str, &[(&str, &[&str])])] = &[
    (
        "Jessore",
        &[
            ("Manirampur", &["Chaluahati", "Dhakuria"]),
            ("Keshabpur", &["Sagardari", "Panjia"]),
        ],
    ),
    (
        "Satkhira",
        &[
            ("Tala", &["Khalishkhali", "Islamkati"]),
            ("Kalaroa", &["Joynagar"]),
        ],
    ),
    ("Khulna", &[("Dumuria", &["Rudaghora", "Sahas", "Bhandarpara"])]),
];

const GENDERS: &[&str] = &["Male", "Female", "Other"];
const YES_NO: &[&str] = &["Yes", "No"];
const YES_NO_NA: &[&str] = &["Yes", "No", "Not Applicable"];
const QUALIFICATIONS: &[&str] = &[
    "Class 1",
    "Class 3",
    "Class 5",
    "Class 8",
    "SSC",
    "Not Applicable",
];
const SCHOOL_TYPES: &[&str] = &["Government", "Madrasa", "Special school", "Not Applicable"];
const FAMILY_INCOME: &[&str] = &["Below 5000", "5000-10000", "10000-20000", "Above 20000"];
const FAMILY_OCCUPATIONS: &[&str] = &[
    "Agriculture",
    "Day labour",
    "Business",
    "Service",
    "Fishing",
];
const PERSON_INCOME: &[&str] = &["Below 1000", "1000-3000", "3000-5000"];
const PERSON_OCCUPATIONS: &[&str] = &["Tailoring", "Shop keeping", "Farming", "Handicraft"];
const AGE_FOR_OCC: &[&str] = &["15-20", "21-30", "31-40", "41+"];
const FIRST_NAMES: &[&str] = &[
    "Rahim", "Karim", "Ayesha", "Fatema", "Sumon", "Nasrin", "Jamal", "Rina",
];
const FAMILY_NAMES: &[&str] = &["Hossain", "Begum", "Islam", "Akter", "Uddin", "Khatun"];

fn main() {
    let mut rng = SimpleRng::new(42);
    let output_path = "sample_survey.csv";

    let mut writer = match csv::Writer::from_path(output_path) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Failed to create {output_path}: {e}");
            std::process::exit(1);
        }
    };

    let headers: Vec<&str> = Column::ALL.iter().map(|c| c.header()).collect();
    let mut rows = vec![headers.iter().map(|h| h.to_string()).collect::<Vec<_>>()];

    for (district, upazillas) in LOCATIONS {
        for (upazilla, unions) in *upazillas {
            for union in *unions {
                for v in 1..=2 {
                    let village = format!("{union} Para {v}");
                    for _ in 0..(4 + rng.below(5)) {
                        rows.push(survey_row(&mut rng, district, upazilla, union, &village));
                    }
                }
            }
        }
    }

    let n_records = rows.len() - 1;
    for row in &rows {
        if let Err(e) = writer.write_record(row) {
            eprintln!("Failed to write record: {e}");
            std::process::exit(1);
        }
    }
    if let Err(e) = writer.flush() {
        eprintln!("Failed to flush {output_path}: {e}");
        std::process::exit(1);
    }

    println!("Wrote {n_records} survey records to {output_path}");
}

fn survey_row(
    rng: &mut SimpleRng,
    district: &str,
    upazilla: &str,
    union: &str,
    village: &str,
) -> Vec<String> {
    let age = 3 + rng.below(60);
    let adult = age >= 15;
    let mut cells = vec![String::new(); Column::COUNT];
    let mut set = |col: Column, value: String| cells[col.index()] = value;

    set(Column::District, district.to_string());
    set(Column::Upazilla, upazilla.to_string());
    set(Column::Union, union.to_string());
    set(Column::Village, village.to_string());
    set(
        Column::Name,
        format!("{} {}", rng.pick(FIRST_NAMES), rng.pick(FAMILY_NAMES)),
    );
    set(Column::Age, age.to_string());
    set(Column::FatherName, format!("{} {}", rng.pick(FIRST_NAMES), rng.pick(FAMILY_NAMES)));
    set(Column::MotherName, format!("{} {}", rng.pick(FIRST_NAMES), rng.pick(FAMILY_NAMES)));
    set(Column::Gender, rng.pick(GENDERS).to_string());
    set(Column::DisabilityCard, rng.pick(YES_NO).to_string());
    set(Column::Skilled, rng.pick(YES_NO).to_string());
    set(Column::GoesToSchool, rng.pick(YES_NO_NA).to_string());
    set(Column::Qualification, rng.pick(QUALIFICATIONS).to_string());
    set(Column::SchoolType, rng.pick(SCHOOL_TYPES).to_string());
    set(Column::FamilyIncome, rng.pick(FAMILY_INCOME).to_string());
    set(Column::FamilyOccupation, rng.pick(FAMILY_OCCUPATIONS).to_string());
    set(Column::FamilyMembers, (2 + rng.below(8)).to_string());

    // only some adults report their own income and occupation
    if adult && rng.chance(60) {
        set(Column::PersonIncome, rng.pick(PERSON_INCOME).to_string());
        set(Column::PersonOccupation, rng.pick(PERSON_OCCUPATIONS).to_string());
        set(Column::AgeForOccupation, rng.pick(AGE_FOR_OCC).to_string());
    }

    for col in Column::SERVICES {
        set(col, rng.pick(YES_NO_NA).to_string());
    }
    cells
}
