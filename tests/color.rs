mod tests {
    use arcade_led_core::{
        Error,
        color::{Color, ColorFormat, ColorRegistry, Filter, Rgb, blend_colors, blend_percent},
    };

    const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
    const BLUE: Rgb = Rgb { r: 0, g: 0, b: 255 };
    const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    fn registry() -> ColorRegistry {
        let mut registry = ColorRegistry::new();
        registry
            .load(
                [("Red", "FF0000"), ("Orange", "#FF8000"), ("Blue", "0x0000ff")],
                ColorFormat::Hex,
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_blend_colors() {
        assert_eq!(blend_colors(RED, BLUE, 0), RED);
        assert_eq!(blend_colors(RED, BLUE, 255), BLUE);
        assert_eq!(
            blend_colors(RED, BLUE, 128),
            Rgb {
                r: 127,
                g: 0,
                b: 128
            }
        );
        assert_eq!(blend_colors(WHITE, BLACK, 255), BLACK);
    }

    #[test]
    fn test_blend_percent_bounds() {
        assert_eq!(blend_percent(RED, BLUE, 0), RED);
        assert_eq!(blend_percent(RED, BLUE, 100), BLUE);
        assert_eq!(blend_percent(BLACK, WHITE, 50), Rgb::new(128, 128, 128));
        // Above 100 is treated as 100
        assert_eq!(blend_percent(RED, BLUE, 250), BLUE);
    }

    #[test]
    fn test_parse_hex() {
        for value in ["FF8000", "#ff8000", "0xFF8000", " FF8000 "] {
            let color = Color::parse("Orange", value, ColorFormat::Hex).unwrap();
            assert_eq!(color.components(), (255, 128, 0), "{value}");
        }
        for value in ["FF80", "GG8000", "", "#FF800000"] {
            assert!(matches!(
                Color::parse("Bad", value, ColorFormat::Hex),
                Err(Error::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_parse_decimal() {
        let color = Color::parse("Teal", "0, 128,128", ColorFormat::Decimal).unwrap();
        assert_eq!(color.name(), "Teal");
        assert_eq!(color.rgb(), Rgb::new(0, 128, 128));

        for value in ["0,128", "0,128,256", "0,128,128,1", "a,b,c"] {
            assert!(Color::parse("Bad", value, ColorFormat::Decimal).is_err());
        }
    }

    #[test]
    fn test_components_round_trip() {
        for (r, g, b) in [(0, 0, 0), (1, 2, 3), (255, 255, 255), (18, 52, 86)] {
            let value = format!("{r:02X}{g:02X}{b:02X}");
            let color = Color::parse("C", &value, ColorFormat::Hex).unwrap();
            assert_eq!(color.components(), (r, g, b));

            let value = format!("{r},{g},{b}");
            let color = Color::parse("C", &value, ColorFormat::Decimal).unwrap();
            assert_eq!(color.components(), (r, g, b));
        }
    }

    #[test]
    fn test_color_format_names() {
        assert_eq!(ColorFormat::parse("hex").unwrap(), ColorFormat::Hex);
        assert_eq!(ColorFormat::parse("Decimal").unwrap(), ColorFormat::Decimal);
        assert!(matches!(
            ColorFormat::parse("hsv"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_fixed_colors() {
        assert_eq!(Color::on().rgb(), WHITE);
        assert_eq!(Color::off().rgb(), BLACK);
        assert_eq!(Color::new("Gray", 30, 60, 90).brightness(), 60);
    }

    #[test]
    fn test_registry_lookup() {
        let registry = registry();
        assert!(registry.is_loaded());
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.lookup("Blue").unwrap().rgb(), BLUE);
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            ["Red", "Orange", "Blue"]
        );
        assert!(matches!(
            registry.lookup("Purple"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_registry_is_write_once() {
        let mut registry = registry();
        assert_eq!(
            registry.load([("Green", "00FF00")], ColorFormat::Hex),
            Err(Error::AlreadyLoaded)
        );
        assert!(registry.lookup("Green").is_err());
    }

    #[test]
    fn test_registry_failed_load_keeps_nothing() {
        let mut registry = ColorRegistry::new();
        let result = registry.load([("Red", "FF0000"), ("Broken", "nope")], ColorFormat::Hex);
        assert!(matches!(result, Err(Error::Configuration(_))));
        assert!(!registry.is_loaded());
        assert!(registry.is_empty());

        let result = registry.load([("Red", "FF0000"), ("Red", "00FF00")], ColorFormat::Hex);
        assert!(matches!(result, Err(Error::Configuration(_))));

        registry
            .load_with_format_name([("Red", "255,0,0")], "decimal")
            .unwrap();
        assert_eq!(registry.lookup("Red").unwrap().rgb(), RED);
    }

    #[test]
    fn test_unknown_format_name() {
        let mut registry = ColorRegistry::new();
        assert!(matches!(
            registry.load_with_format_name([("Red", "FF0000")], "cmyk"),
            Err(Error::Configuration(_))
        ));
        assert!(!registry.is_loaded());
    }

    #[test]
    fn test_filters() {
        let current = Rgb::new(200, 100, 0);

        assert_eq!(Filter::Normal.apply(current, BLUE, 10), BLUE);
        assert_eq!(Filter::Combine.apply(current, BLUE, 0), current);
        assert_eq!(Filter::Combine.apply(current, BLUE, 100), BLUE);
        assert_eq!(
            Filter::Covert.apply(current, Rgb::new(100, 200, 50), 100),
            Rgb::new(200, 200, 50)
        );
        assert_eq!(Filter::Mask.apply(current, WHITE, 100), current);
        assert_eq!(Filter::Mask.apply(current, BLACK, 100), BLACK);
        assert_eq!(Filter::Invert.apply(current, WHITE, 100), BLACK);
        assert_eq!(Filter::Invert.apply(current, BLACK, 100), WHITE);
        // Partial intensity blends the complement like Combine does
        assert_eq!(Filter::Invert.apply(current, BLACK, 0), current);
        assert_eq!(
            Filter::Invert.apply(current, BLACK, 50),
            Rgb::new(228, 178, 128)
        );
        assert_eq!(
            Filter::Invert.apply(current, BLACK, 50),
            Filter::Combine.apply(current, WHITE, 50)
        );
    }

    #[test]
    fn test_filter_names() {
        for filter in [
            Filter::Normal,
            Filter::Combine,
            Filter::Covert,
            Filter::Mask,
            Filter::Invert,
        ] {
            assert_eq!(Filter::parse(filter.as_str()).unwrap(), filter);
        }
        assert_eq!(Filter::default(), Filter::Normal);
        assert!(Filter::parse("Screen").is_err());
    }
}
