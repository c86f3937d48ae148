use boxblur_compute::{read_bmp, run, write_bmp, BlurEngine, BmpImage, Pixel, PixelGrid};

#[test]
fn white_image_stays_white() {
    let white = PixelGrid::filled(4, 4, Pixel::WHITE);

    for workers in [1, 4, 10] {
        for rounds in [1, 2, 17] {
            let outcome = run(white.clone(), workers, rounds).unwrap();
            assert!(
                outcome.grid.is_uniform(Pixel::WHITE),
                "{workers} workers, {rounds} rounds"
            );
        }
    }
}

#[test]
fn flat_image_is_fixed_point_at_reference_settings() {
    let flat = PixelGrid::filled(16, 12, Pixel::rgb(12, 34, 56));

    let outcome = run(flat.clone(), 10, 100).unwrap();

    assert_eq!(outcome.grid, flat);
}

#[test]
fn single_dark_pixel_reaches_only_its_neighbours_in_one_round() {
    let mut image = PixelGrid::filled(7, 7, Pixel::WHITE);
    image.set(3, 3, Pixel::BLACK);

    for workers in [1, 4, 10] {
        let grid = run(image.clone(), workers, 1).unwrap().grid;

        for row in 0..7usize {
            for col in 0..7usize {
                let near = row.abs_diff(3) <= 1 && col.abs_diff(3) <= 1;
                // 8 * 255 / 9 + 0.5 = 227.17
                let expected = if near {
                    Pixel::rgb(227, 227, 227)
                } else {
                    Pixel::WHITE
                };
                assert_eq!(grid.get(row, col), expected, "({row}, {col}) with {workers} workers");
            }
        }
    }
}

#[test]
fn spike_on_three_by_three_torus() {
    let mut image = PixelGrid::new(3, 3);
    image.set(
        1,
        1,
        Pixel {
            blue: 10,
            green: 20,
            red: 30,
        },
    );

    let grid = run(image, 2, 1).unwrap().grid;

    assert!(grid.is_uniform(Pixel {
        blue: 1,
        green: 2,
        red: 3,
    }));
}

#[test]
fn one_pixel_image_is_unchanged() {
    let image = PixelGrid::filled(1, 1, Pixel::rgb(1, 2, 3));

    let grid = run(image.clone(), 10, 100).unwrap().grid;

    assert_eq!(grid, image);
}

#[test]
fn bmp_file_through_engine() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.bmp");
    let output = dir.path().join("output.bmp");

    let mut grid = PixelGrid::filled(8, 8, Pixel::WHITE);
    grid.set(0, 0, Pixel::BLACK);
    let source = BmpImage::from_grid(grid).unwrap();
    write_bmp(&input, &source.header, &source.pixels).unwrap();

    let loaded = read_bmp(&input).unwrap();
    let engine = BlurEngine::new(4, 1).unwrap();
    let outcome = engine.run(loaded.pixels).unwrap();
    write_bmp(&output, &loaded.header, &outcome.grid).unwrap();

    let saved = read_bmp(&output).unwrap();
    assert_eq!(saved.header, source.header);
    // The corner wraps onto the opposite edges
    assert_eq!(saved.pixels.get(7, 7), Pixel::rgb(227, 227, 227));
    assert_eq!(saved.pixels.get(0, 1), Pixel::rgb(227, 227, 227));
    assert_eq!(saved.pixels.get(4, 4), Pixel::WHITE);
}
