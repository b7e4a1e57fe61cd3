//! ISO 3166-1 alpha-3 codes and their French display names, as the CRM's
//! country picklists expect them.

/// Canonical codes first, sorted; legacy aliases (`MUR`, `ROM`) last so a
/// reverse lookup lands on the current code.
static ISO3_NAMES: &[(&str, &str)] = &[
    ("AFG", "Afghanistan"),
    ("AGO", "Angola"),
    ("ALB", "Albanie"),
    ("AND", "Andorre"),
    ("ARE", "Émirats arabes unis"),
    ("ARG", "Argentine"),
    ("ARM", "Arménie"),
    ("ATG", "Antigua-et-Barbuda"),
    ("AUS", "Australie"),
    ("AUT", "Autriche"),
    ("AZE", "Azerbaïdjan"),
    ("BDI", "Burundi"),
    ("BEL", "Belgique"),
    ("BEN", "Bénin"),
    ("BFA", "Burkina Faso"),
    ("BGD", "Bangladesh"),
    ("BGR", "Bulgarie"),
    ("BHR", "Bahreïn"),
    ("BHS", "Bahamas"),
    ("BIH", "Bosnie-Herzégovine"),
    ("BLR", "Biélorussie"),
    ("BLZ", "Belize"),
    ("BOL", "Bolivie"),
    ("BRA", "Brésil"),
    ("BRB", "Barbade"),
    ("BRN", "Brunei"),
    ("BTN", "Bhoutan"),
    ("BWA", "Botswana"),
    ("CAF", "République centrafricaine"),
    ("CAN", "Canada"),
    ("CHE", "Suisse"),
    ("CHL", "Chili"),
    ("CHN", "Chine"),
    ("CIV", "Côte d'Ivoire"),
    ("CMR", "Cameroun"),
    ("COD", "République démocratique du Congo"),
    ("COG", "République du Congo"),
    ("COK", "Îles Cook"),
    ("COL", "Colombie"),
    ("COM", "Comores"),
    ("CPV", "Cap Vert"),
    ("CRI", "Costa Rica"),
    ("CUB", "Cuba"),
    ("CYP", "Chypre"),
    ("CZE", "République Tchèque"),
    ("DEU", "Allemagne"),
    ("DJI", "Djibouti"),
    ("DMA", "Dominique"),
    ("DNK", "Danemark"),
    ("DOM", "République Dominicaine"),
    ("DZA", "Algérie"),
    ("ECU", "Équateur"),
    ("EGY", "Égypte"),
    ("ERI", "Érythrée"),
    ("ESP", "Espagne"),
    ("EST", "Estonie"),
    ("ETH", "Éthiopie"),
    ("FIN", "Finlande"),
    ("FJI", "Fidji"),
    ("FRA", "France"),
    ("FSM", "Micronésie"),
    ("GAB", "Gabon"),
    ("GBR", "Royaume-Uni"),
    ("GEO", "Géorgie"),
    ("GHA", "Ghana"),
    ("GIN", "Guinée"),
    ("GMB", "Gambie"),
    ("GNB", "Guinée-Bissau"),
    ("GNQ", "Guinée équatoriale"),
    ("GRC", "Grèce"),
    ("GRD", "Grenade"),
    ("GTM", "Guatemala"),
    ("GUY", "Guyane"),
    ("HKG", "Hong Kong"),
    ("HND", "Honduras"),
    ("HRV", "Croatie"),
    ("HTI", "Haïti"),
    ("HUN", "Hongrie"),
    ("IDN", "Indonésie"),
    ("IND", "Inde"),
    ("IRL", "Irlande"),
    ("IRN", "Iran"),
    ("IRQ", "Irak"),
    ("ISL", "Islande"),
    ("ISR", "Israël"),
    ("ITA", "Italie"),
    ("JAM", "Jamaïque"),
    ("JOR", "Jordanie"),
    ("JPN", "Japon"),
    ("KAZ", "Kazakhstan"),
    ("KEN", "Kenya"),
    ("KGZ", "Kirghizistan"),
    ("KHM", "Cambodge"),
    ("KIR", "Kiribati"),
    ("KNA", "Saint-Kitts-et-Nevis"),
    ("KOR", "Corée du Sud"),
    ("KWT", "Koweït"),
    ("LAO", "Laos"),
    ("LBN", "Liban"),
    ("LBR", "Libéria"),
    ("LBY", "Libye"),
    ("LCA", "Sainte-Lucie"),
    ("LIE", "Liechtenstein"),
    ("LKA", "Sri Lanka"),
    ("LSO", "Lesotho"),
    ("LTU", "Lituanie"),
    ("LUX", "Luxembourg"),
    ("LVA", "Lettonie"),
    ("MAC", "Macao"),
    ("MAR", "Maroc"),
    ("MCO", "Monaco"),
    ("MDA", "Moldavie"),
    ("MDG", "Madagascar"),
    ("MDV", "Maldives"),
    ("MEX", "Mexique"),
    ("MHL", "Îles Marshall"),
    ("MKD", "Macédoine"),
    ("MLI", "Mali"),
    ("MLT", "Malte"),
    ("MMR", "Myanmar"),
    ("MNE", "Monténégro"),
    ("MNG", "Mongolie"),
    ("MOZ", "Mozambique"),
    ("MRT", "Mauritanie"),
    ("MUS", "Maurice"),
    ("MWI", "Malawi"),
    ("MYS", "Malaisie"),
    ("NAM", "Namibie"),
    ("NER", "Niger"),
    ("NGA", "Nigéria"),
    ("NIC", "Nicaragua"),
    ("NIU", "Niue"),
    ("NLD", "Pays-Bas"),
    ("NOR", "Norvège"),
    ("NPL", "Népal"),
    ("NRU", "Nauru"),
    ("NZL", "Nouvelle-Zélande"),
    ("OMN", "Oman"),
    ("PAK", "Pakistan"),
    ("PAN", "Panama"),
    ("PER", "Pérou"),
    ("PHL", "Philippines"),
    ("PLW", "Palaos"),
    ("PNG", "Papouasie-Nouvelle-Guinée"),
    ("POL", "Pologne"),
    ("PRK", "Corée du Nord"),
    ("PRT", "Portugal"),
    ("PRY", "Paraguay"),
    ("PSE", "Palestine"),
    ("QAT", "Qatar"),
    ("ROU", "Roumanie"),
    ("RUS", "Russie"),
    ("RWA", "Rwanda"),
    ("SAU", "Arabie Saoudite"),
    ("SDN", "Soudan"),
    ("SEN", "Sénégal"),
    ("SGP", "Singapour"),
    ("SLB", "Îles Salomon"),
    ("SLE", "Sierra Leone"),
    ("SLV", "Le Salvador"),
    ("SMR", "Saint Marin"),
    ("SOM", "Somalie"),
    ("SRB", "Serbie"),
    ("SSD", "Soudan du Sud"),
    ("STP", "Sao Tomé-et-Principe"),
    ("SUR", "Suriname"),
    ("SVK", "Slovaquie"),
    ("SVN", "Slovénie"),
    ("SWE", "Suède"),
    ("SWZ", "Eswatini"),
    ("SYC", "Seychelles"),
    ("SYR", "Syrie"),
    ("TCD", "Tchad"),
    ("TGO", "Togo"),
    ("THA", "Thaïlande"),
    ("TJK", "Tajikistan"),
    ("TKM", "Turkménistan"),
    ("TLS", "Timor oriental"),
    ("TON", "Tonga"),
    ("TTO", "Trinité-et-Tobago"),
    ("TUN", "Tunisie"),
    ("TUR", "Turquie"),
    ("TUV", "Tuvalu"),
    ("TWN", "Taïwan"),
    ("TZA", "Tanzanie"),
    ("UGA", "Ouganda"),
    ("UKR", "Ukraine"),
    ("URY", "Uruguay"),
    ("USA", "États-Unis"),
    ("UZB", "Ouzbékistan"),
    ("VAT", "Vatican"),
    ("VCT", "Saint-Vincent-et-les-Grenadines"),
    ("VEN", "Vénézuela"),
    ("VNM", "Vietnam"),
    ("VUT", "Vanuatu"),
    ("WSM", "Samoa"),
    ("YEM", "Yemen"),
    ("ZAF", "Afrique du Sud"),
    ("ZMB", "Zambie"),
    ("ZWE", "Zimbabwe"),
    ("MUR", "Maurice"),
    ("ROM", "Roumanie"),
];

/// `FRA` → `France`. Case-insensitive, surrounding whitespace ignored.
pub fn iso3_to_name(code: &str) -> Option<&'static str> {
    let code = code.trim();
    ISO3_NAMES
        .iter()
        .find(|(iso, _)| iso.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

/// `france` → `FRA`. Case-insensitive on the full name.
pub fn name_to_iso3(name: &str) -> Option<&'static str> {
    let wanted = name.trim().to_lowercase();
    ISO3_NAMES
        .iter()
        .find(|(_, n)| n.to_lowercase() == wanted)
        .map(|(iso, _)| *iso)
}
