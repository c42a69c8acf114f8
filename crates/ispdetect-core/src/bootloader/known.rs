//! Compiled-in catalog of known bootloader images

use super::fingerprint::Fingerprint;

/// A bootloader image identified by the MD5 of its boot block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownImage {
    /// Digest of the full boot block contents
    pub fingerprint: Fingerprint,
    /// Image name
    pub name: &'static str,
}

impl KnownImage {
    /// Create an entry from a hex digest literal
    pub const fn new(name: &'static str, md5: &str) -> Self {
        Self {
            fingerprint: Fingerprint::from_hex(md5),
            name,
        }
    }
}

/// Common Arduino-family bootloaders, searched in order
pub static KNOWN_IMAGES: &[KnownImage] = &[
    KnownImage::new("ATmegaBOOT_168_atmega328", "0AACF716F43CA2C9277E08B9D690BC02"),
    KnownImage::new("ATmegaBOOT_168_atmega328_pro_8MHz", "27EB87145D45D4D8414452CE0A2B8C5F"),
    KnownImage::new("ATmegaBOOT_168_atmega1280", "01241356604D917EDCEE84D119EF91CE"),
    KnownImage::new("ATmegaBOOT_168_diecimila", "1461CEDF85460D96CC41CB016940281A"),
    KnownImage::new("ATmegaBOOT_168_ng", "6A229FB464373FA30C68391D6A972C40"),
    KnownImage::new("ATmegaBOOT_168_pro_8MHz", "FF99A2C0D9C9E51B987D9E5612C2A4A1"),
    KnownImage::new("ATmegaBOOT", "986DCFBB55E1221EE43CC207B22B46AE"),
    KnownImage::new("ATmegaBOOT_168", "37C0FC90E2A05D8F62EBAE9C36C22405"),
    KnownImage::new("ATmegaBOOT_168_atmega328_bt", "293EB3B739842D35BA9D02F9C7F7C9D6"),
    KnownImage::new("LilyPadBOOT_168", "FCAF050EB4D72D758F418C858356AA35"),
    KnownImage::new("optiboot_atmega328_IDE_0022", "5571A18C813B9ED2E63BC93B9AB17953"),
    KnownImage::new("optiboot_atmega328_pro_8MHz", "3C0890A16A13A2F0A51D26ECF14B0FB3"),
    KnownImage::new("optiboot_lilypad", "ADBDA74A4FABA8653492F8C9CE587D78"),
    KnownImage::new("optiboot_luminet", "7B5CAC082A0B2D456911A7A0AE657F66"),
    KnownImage::new("optiboot_pro_16MHz", "6A950AE1DB1F9DC78CF8A480B51E54E1"),
    KnownImage::new("optiboot_pro_20mhz", "2C55B4B8B5C5CBC4D33699CB4B9FDABE"),
    KnownImage::new("stk500boot_v2_mega2560", "1E3514081F657F8C9650699F191E3DF0"),
    KnownImage::new("DiskLoader-Leonardo", "C259715F9628E3AAB069E2AFF085A120"),
    KnownImage::new("optiboot_atmega8", "E4AFF66B78DAE430FEB652AF53521849"),
    KnownImage::new("optiboot_atmega168", "3A89304B15F5BB11AAE6E6DC7CF59135"),
    KnownImage::new("optiboot_atmega328", "FBF49B7B59737F65E8D0F8A50812E79F"),
    KnownImage::new("optiboot_atmega328-Mini", "7FDFE1B26F528FBD7CFE7EE084C0A56B"),
    KnownImage::new("ATmegaBOOT_324P", "31280B06ADB5A4C92DEFB3692922EABF"),
    KnownImage::new("ATmegaBOOT_644", "E893444337D3283C7D9AEB8446D54542"),
    KnownImage::new("ATmegaBOOT_644P", "516910408F0781C64851545E9673C2EB"),
    KnownImage::new("Mega2560_Original", "B9499309491A646ECD584789C2D8A46C"),
    KnownImage::new("optiboot_atmega1284p", "71DDC28464C47327D233011EFAE1244B"),
    KnownImage::new("Ruggeduino", "0F02317295C8F7FD1BB7071785A56687"),
    KnownImage::new("Leonardo-prod-firmware-2012-04-26", "53E02CBC87F50B682C7113E0ED840534"),
    KnownImage::new("atmega2560_bootloader_watchdog_bug_fixed", "12AA80074D74E3DABF2D25846D99F720"),
    KnownImage::new("Esplora", "3256C1D3AC78324D046D3F6D01ECAE09"),
    KnownImage::new("Sanguino_ATmegaBOOT_644P", "39CC80D6DEA2C4916FBCE8DD70F2A233"),
    KnownImage::new("Sanguino_ATmegaBOOT_168_atmega644p", "6049C60AE6315CC1BAD724EF8B6DE6D0"),
    KnownImage::new("Sanguino_ATmegaBOOT_168_atmega1284p", "C117E35E9C43665F1E4C4195446047D5"),
    KnownImage::new("Sanguino_ATmegaBOOT_168_atmega1284p_8m", "274B688A8AA24CE7307F973787164E21"),
    KnownImage::new("Arduino-dfu-usbserial-atmega16u2-Uno-Rev3", "D88C706DFE1FDC38821ECEAE23B2E6E7"),
];
