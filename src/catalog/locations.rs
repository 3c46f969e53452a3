/// Country -> state -> cities. Every level carries an "Any" entry.
const LOCATIONS: &[(&str, &[(&str, &[&str])])] = &[
    ("United States", &[
        ("California", &["Los Angeles", "San Francisco", "San Diego", "Sacramento", "San Jose", "Any"]),
        ("New York", &["New York City", "Buffalo", "Rochester", "Albany", "Syracuse", "Any"]),
        ("Texas", &["Houston", "Dallas", "Austin", "San Antonio", "Fort Worth", "Any"]),
        ("Florida", &["Miami", "Orlando", "Tampa", "Jacksonville", "Fort Lauderdale", "Any"]),
        ("Illinois", &["Chicago", "Springfield", "Naperville", "Aurora", "Rockford", "Any"]),
        ("Pennsylvania", &["Philadelphia", "Pittsburgh", "Allentown", "Erie", "Reading", "Any"]),
        ("Any", &["Any"]),
    ]),
    ("Canada", &[
        ("Ontario", &["Toronto", "Ottawa", "Mississauga", "Hamilton", "London", "Any"]),
        ("Quebec", &["Montreal", "Quebec City", "Laval", "Gatineau", "Longueuil", "Any"]),
        ("British Columbia", &["Vancouver", "Victoria", "Surrey", "Burnaby", "Richmond", "Any"]),
        ("Alberta", &["Calgary", "Edmonton", "Red Deer", "Lethbridge", "Fort McMurray", "Any"]),
        ("Manitoba", &["Winnipeg", "Brandon", "Steinbach", "Thompson", "Portage la Prairie", "Any"]),
        ("Any", &["Any"]),
    ]),
    ("United Kingdom", &[
        ("England", &["London", "Manchester", "Birmingham", "Liverpool", "Leeds", "Any"]),
        ("Scotland", &["Edinburgh", "Glasgow", "Aberdeen", "Dundee", "Inverness", "Any"]),
        ("Wales", &["Cardiff", "Swansea", "Newport", "Wrexham", "Barry", "Any"]),
        ("Northern Ireland", &["Belfast", "Derry", "Lisburn", "Newry", "Armagh", "Any"]),
        ("Any", &["Any"]),
    ]),
    ("Australia", &[
        ("New South Wales", &["Sydney", "Newcastle", "Wollongong", "Central Coast", "Maitland", "Any"]),
        ("Victoria", &["Melbourne", "Geelong", "Ballarat", "Bendigo", "Shepparton", "Any"]),
        ("Queensland", &["Brisbane", "Gold Coast", "Sunshine Coast", "Townsville", "Cairns", "Any"]),
        ("Western Australia", &["Perth", "Mandurah", "Bunbury", "Kalgoorlie", "Geraldton", "Any"]),
        ("South Australia", &["Adelaide", "Mount Gambier", "Whyalla", "Murray Bridge", "Port Augusta", "Any"]),
        ("Any", &["Any"]),
    ]),
    ("India", &[
        ("Maharashtra", &["Mumbai", "Pune", "Nagpur", "Thane", "Nashik", "Any"]),
        ("Delhi", &["New Delhi", "Delhi", "Any"]),
        ("Karnataka", &["Bangalore", "Mysore", "Hubli", "Mangalore", "Belgaum", "Any"]),
        ("Tamil Nadu", &["Chennai", "Coimbatore", "Madurai", "Tiruchirappalli", "Salem", "Any"]),
        ("Gujarat", &["Ahmedabad", "Surat", "Vadodara", "Rajkot", "Bhavnagar", "Any"]),
        ("West Bengal", &["Kolkata", "Howrah", "Durgapur", "Asansol", "Siliguri", "Any"]),
        ("Rajasthan", &["Jaipur", "Jodhpur", "Udaipur", "Kota", "Ajmer", "Any"]),
        ("Uttar Pradesh", &["Lucknow", "Kanpur", "Agra", "Varanasi", "Meerut", "Any"]),
        ("Any", &["Any"]),
    ]),
    ("Any", &[("Any", &["Any"])]),
];

/// Pure, synchronous location lookup. Unknown inputs yield `["Any"]`.
pub trait LocationLookup {
    fn countries(&self) -> Vec<String>;
    fn states_for(&self, country: &str) -> Vec<String>;
    fn cities_for(&self, country: &str, state: &str) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StaticLocations;

fn any() -> Vec<String> {
    vec!["Any".to_string()]
}

fn states(country: &str) -> Option<&'static [(&'static str, &'static [&'static str])]> {
    LOCATIONS.iter().find(|(c, _)| *c == country).map(|(_, s)| *s)
}

impl LocationLookup for StaticLocations {
    fn countries(&self) -> Vec<String> {
        LOCATIONS.iter().map(|(c, _)| c.to_string()).collect()
    }

    fn states_for(&self, country: &str) -> Vec<String> {
        match states(country) {
            Some(list) => list.iter().map(|(s, _)| s.to_string()).collect(),
            None => any(),
        }
    }

    fn cities_for(&self, country: &str, state: &str) -> Vec<String> {
        states(country)
            .and_then(|list| list.iter().find(|(s, _)| *s == state))
            .map(|(_, cities)| cities.iter().map(|c| c.to_string()).collect())
            .unwrap_or_else(any)
    }
}
