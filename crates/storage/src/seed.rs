//! Built-in catalog of Ukrainian literature used to populate a fresh store.
//!
//! Seeding is the only writer of the catalog. It is idempotent: every record
//! is upserted under a fixed id.

use lit_core::model::{
    Author, AuthorId, Category, Difficulty, Quiz, QuizError, QuizId, QuizType, WorkDraft,
    WorkError, WorkId,
};
use thiserror::Error;
use tracing::info;

use crate::repository::{CatalogRepository, StorageError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SeedError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Work(#[from] WorkError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
}

/// Counts of records written by `seed_catalog`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    pub authors: usize,
    pub works: usize,
    pub quizzes: usize,
}

struct SeedWork {
    id: u64,
    title: &'static str,
    author: u64,
    category: Category,
    description: &'static str,
    year: i32,
    genre: &'static str,
    summary: &'static str,
    characters: &'static str,
    themes: &'static str,
    full_text: Option<&'static str>,
    quotes: [&'static str; 3],
}

struct SeedQuiz {
    id: u64,
    title: &'static str,
    work: Option<u64>,
    question_count: u32,
    difficulty: Difficulty,
    quiz_type: QuizType,
    icon: Option<&'static str>,
    questions: &'static str,
    minutes: u32,
}

const AUTHORS: [(u64, &str); 8] = [
    (1, "Іван Нечуй-Левицький"),
    (2, "Михайло Коцюбинський"),
    (3, "Леся Українка"),
    (4, "Тарас Шевченко"),
    (5, "Іван Франко"),
    (6, "Сергій Жадан"),
    (7, "Марія Матіос"),
    (8, "Софія Андрухович"),
];

const KAIDASH_TEXT: &str = "\
Село Семигори стоїть над Россю, у глибокій долині між крутими горами.
Над самою річкою, на високому березі, стоїть хата Омелька Кайдаша, обсаджена вишняком.
Кайдаш був чоловік побожний і роботящий, але любив зайти в шинок, а звідти вертав уже не таким тихим.
Його жінка Маруся колись служила в панів і звикла до панських звичаїв, тому й у своїй хаті хотіла бути за пані.
Старший син Карпо вдався в батька: мовчазний, упертий, тихий, та коли розсердиться, то вже не вгамуєш.
Менший, Лаврін, був веселий і жартівливий, любив пісні й гулянки та задивлявся на дівчат.
Коли в хату прийшли невістки, Мотря й Мелашка, тісно стало всім під одним дахом.
Почалися сварки за кожен горщик, за кожну ложку, а далі й за грушу, що росла на межі.";

const TINI_TEXT: &str = "\
Іван був дев'ятнадцятою дитиною в гуцульській родині Палійчуків.
Змалку він був якийсь не такий, як інші діти: дивився кудись уперед, ніби бачив те, чого не бачать інші.
Ліс і гори говорили до нього, і він слухав їх так само уважно, як слухав мову людей.
На храмовому святі він уперше побачив Марічку, доньку ворогів свого роду.
Діти подружилися, а згодом дружба стала коханням, сильнішим за давню родову ворожнечу.
Марічка співала, і пісні її розходилися полониною, мов дзвіночки овечої отари.";

const LISOVA_TEXT: &str = "\
Старезний, дрімучий ліс на Волині, посередині просторої галяви, з одного боку стоїть дуб.
Весна розбуджує ліс, і з-під криги виходить Той, що греблі рве, а за ним прокидається Мавка.
До лісу приходить дядько Лев із небожем Лукашем, і Лукаш грає на сопілці.
Мавка слухає ту гру, і її серце, що досі знало тільки ліс, починає співати разом із сопілкою.
Лукаш будує хату на краю лісу, і Мавка залишається з ним, хоч лісові сили застерігають її.
Та у світі людей жадоба і дрібні клопоти гасять ту пісню, що колись звучала в Лукашевій душі.
Мавка знає, що має в серці те, що не вмирає, і це дає їй силу пройти крізь зраду.";

const WORKS: [SeedWork; 9] = [
    SeedWork {
        id: 1,
        title: "Кайдашева сім'я",
        author: 1,
        category: Category::Zno,
        description: "Повість про життя українського села 19 століття",
        year: 1878,
        genre: "Соціально-побутова повість",
        summary: "Соціально-побутова повість Івана Нечуя-Левицького про родину Кайдашів і сварки між поколіннями.",
        characters: "Омелько Кайдаш, Маруся Кайдашиха, Карпо, Лаврін, Мотря, Мелашка",
        themes: "Родинні цінності, протиставлення поколінь, жадібність, соціальна нерівність",
        full_text: Some(KAIDASH_TEXT),
        quotes: [
            "Отак, сину, як будеш шануватись, то й другі тебе шануватимуть!",
            "В хаті Кайдаша того року не було ладу.",
            "В Карпа була така сама вдача, як і в батька. Тиха вода, казали люди, греблю рве.",
        ],
    },
    SeedWork {
        id: 2,
        title: "Тіні забутих предків",
        author: 2,
        category: Category::Zno,
        description: "Повість про кохання на тлі гуцульських традицій",
        year: 1911,
        genre: "Психологічна новела",
        summary: "Повість Михайла Коцюбинського про кохання Івана і Марічки на тлі карпатських легенд.",
        characters: "Іван Палійчук, Марічка Гутенюк, Палагна, Юра (мольфар)",
        themes: "Кохання і смерть, єдність людини з природою, гуцульська міфологія",
        full_text: Some(TINI_TEXT),
        quotes: [
            "Весь світ був як казка, повна чудес, таємнична, цікава й страшна.",
            "Як безвісти пропасти, затоптані ногами чужих людей.",
            "Запанувала знову мертва тиша, і вороги спокійно спали під одним дахом.",
        ],
    },
    SeedWork {
        id: 3,
        title: "Лісова пісня",
        author: 3,
        category: Category::Zno,
        description: "Драма-феєрія про кохання і людську природу",
        year: 1911,
        genre: "Драма-феєрія",
        summary: "Драма-феєрія Лесі Українки про кохання мавки до сільського парубка Лукаша.",
        characters: "Мавка, Лукаш, Килина, Дядько Лев, Лісовик, Перелесник",
        themes: "Протиставлення духовного і матеріального, природи і цивілізації",
        full_text: Some(LISOVA_TEXT),
        quotes: [
            "Той, хто дихає, той мусить пити, й їсти, і кохати.",
            "Я маю в серці те, що не вмирає.",
            "О, не журися за тіло! Ясним вогнем засвітилось воно.",
        ],
    },
    SeedWork {
        id: 4,
        title: "Кобзар",
        author: 4,
        category: Category::Zno,
        description: "Збірка поетичних творів",
        year: 1840,
        genre: "Поезія, балади, поеми",
        summary: "Збірка поетичних творів Тараса Шевченка, вперше видана у 1840 році.",
        characters: "Катерина, Гайдамаки, Перебендя",
        themes: "Історія України, кріпацтво, боротьба за свободу, любов до Батьківщини",
        full_text: None,
        quotes: [
            "Борітеся - поборете, Вам Бог помагає!",
            "Свою Україну любіть, Любіть її... Во время люте.",
            "І чужому научайтесь, Й свого не цурайтесь.",
        ],
    },
    SeedWork {
        id: 5,
        title: "Захар Беркут",
        author: 5,
        category: Category::Zno,
        description: "Історична повість з часів Данила Галицького",
        year: 1882,
        genre: "Історична повість",
        summary: "Історична повість Івана Франка про боротьбу карпатських горян проти монголо-татар.",
        characters: "Захар Беркут, Максим Беркут, Тугар Вовк, Мирослава, Бурунда",
        themes: "Патріотизм, громадське самоврядування, боротьба з загарбниками",
        full_text: None,
        quotes: [
            "Нема насолоди в могучості, нема би щастя в неволі інших!",
            "Не кидайте топора, коли зарубалися, то й витешіться!",
            "Наша сила в громаді.",
        ],
    },
    SeedWork {
        id: 6,
        title: "Ворошиловград",
        author: 6,
        category: Category::Modern,
        description: "Роман про повернення в рідне місто",
        year: 2010,
        genre: "Сучасний роман",
        summary: "Роман Сергія Жадана про повернення героя до рідного міста на Донбасі.",
        characters: "Герман, Коча, Ольга, Шура, Травмований",
        themes: "Повернення додому, пам'ять, дружба, пошук самого себе",
        full_text: None,
        quotes: [
            "Смерть - це те, що робить нас людьми.",
            "Любов - єдина гра, в якій немає правил",
            "Батьківщина - це те, за що ми готові померти.",
        ],
    },
    SeedWork {
        id: 7,
        title: "Солодка Даруся",
        author: 7,
        category: Category::Modern,
        description: "Драма на три життя",
        year: 2004,
        genre: "Психологічний роман",
        summary: "Роман Марії Матіос про німу жінку з буковинського села і злам історичних епох.",
        characters: "Даруся, Михайло, Матронка, Іван Цвичок",
        themes: "Тоталітаризм, історична пам'ять, психологічна травма, спокута",
        full_text: None,
        quotes: [
            "Гріх - це не тільки вчинок. Гріх - це ще й каяття.",
            "Кожному своя правда, як і кожному - свій хрест.",
            "Душа болить не за покійними - душа болить за живими.",
        ],
    },
    SeedWork {
        id: 8,
        title: "Фелікс Австрія",
        author: 8,
        category: Category::Modern,
        description: "Роман про Галичину початку 20 століття",
        year: 2014,
        genre: "Історичний роман",
        summary: "Роман Софії Андрухович про життя в Станіславові на початку XX століття.",
        characters: "Стефанія Чорненько, Аделя, Петро, Йосиф Рідний",
        themes: "Дружба і залежність, історія Галичини, жіноча доля",
        full_text: None,
        quotes: [
            "Найбільше благо - це згода і добрі стосунки.",
            "Ніщо не робить людину такою нещасною, як її власні рішення.",
            "Ненавиджу свою ніжність і слабкість?",
        ],
    },
    SeedWork {
        id: 9,
        title: "Інтернат",
        author: 6,
        category: Category::Modern,
        description: "Роман про війну на Донбасі",
        year: 2017,
        genre: "Воєнний роман",
        summary: "Роман Сергія Жадана про три дні з життя вчителя, який вивозить племінника з зони бойових дій.",
        characters: "Паша, Саша, Ніна, Шура",
        themes: "Війна і мир, вибір та відповідальність, ідентичність",
        full_text: None,
        quotes: [
            "Війна перевіряє тебе на людяність.",
            "Мертві не відчувають болю.",
            "Ось це і є твоя країна.",
        ],
    },
];

const QUIZZES: [SeedQuiz; 9] = [
    SeedQuiz {
        id: 1,
        title: "Кайдашева сім'я",
        work: Some(1),
        question_count: 10,
        difficulty: Difficulty::Easy,
        quiz_type: QuizType::Book,
        icon: None,
        questions: "Тест на знання повісті 'Кайдашева сім'я'",
        minutes: 15,
    },
    SeedQuiz {
        id: 2,
        title: "Тіні забутих предків",
        work: Some(2),
        question_count: 12,
        difficulty: Difficulty::Medium,
        quiz_type: QuizType::Book,
        icon: None,
        questions: "Запитання про повість Михайла Коцюбинського",
        minutes: 20,
    },
    SeedQuiz {
        id: 3,
        title: "Лісова пісня",
        work: Some(3),
        question_count: 15,
        difficulty: Difficulty::Hard,
        quiz_type: QuizType::Book,
        icon: None,
        questions: "Тест на знання драми-феєрії Лесі Українки",
        minutes: 25,
    },
    SeedQuiz {
        id: 4,
        title: "Кобзар",
        work: Some(4),
        question_count: 14,
        difficulty: Difficulty::Hard,
        quiz_type: QuizType::Book,
        icon: None,
        questions: "Тест на знання поезій Тараса Шевченка",
        minutes: 20,
    },
    SeedQuiz {
        id: 5,
        title: "Захар Беркут",
        work: Some(5),
        question_count: 15,
        difficulty: Difficulty::Medium,
        quiz_type: QuizType::Book,
        icon: None,
        questions: "Тест на знання історичної повісті Івана Франка",
        minutes: 20,
    },
    SeedQuiz {
        id: 6,
        title: "Вгадай цитату",
        work: None,
        question_count: 15,
        difficulty: Difficulty::Hard,
        quiz_type: QuizType::Quote,
        icon: Some("quote"),
        questions: "Вгадайте автора цитати з української літератури",
        minutes: 15,
    },
    SeedQuiz {
        id: 7,
        title: "Поезія Шевченка",
        work: Some(4),
        question_count: 16,
        difficulty: Difficulty::Medium,
        quiz_type: QuizType::Quote,
        icon: Some("book-text"),
        questions: "Тест на знання поезій Тараса Шевченка",
        minutes: 18,
    },
    SeedQuiz {
        id: 8,
        title: "Літературні герої",
        work: None,
        question_count: 20,
        difficulty: Difficulty::Medium,
        quiz_type: QuizType::Character,
        icon: Some("user"),
        questions: "Вкажіть, яким авторам належать літературні герої",
        minutes: 20,
    },
    SeedQuiz {
        id: 9,
        title: "Герої та їх автори",
        work: None,
        question_count: 10,
        difficulty: Difficulty::Easy,
        quiz_type: QuizType::Character,
        icon: Some("user"),
        questions: "Визначення автора за персонажами",
        minutes: 10,
    },
];

/// Upsert the built-in authors, works and quizzes.
///
/// # Errors
///
/// Returns `SeedError` if a record fails validation or cannot be stored.
pub async fn seed_catalog(catalog: &dyn CatalogRepository) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    for (id, name) in AUTHORS {
        catalog
            .upsert_author(&Author::new(AuthorId::new(id), name)?)
            .await?;
        report.authors += 1;
    }

    for seed in &WORKS {
        let mut draft = WorkDraft::new(seed.title, AuthorId::new(seed.author));
        draft.description = Some(seed.description.to_owned());
        draft.category = Some(seed.category);
        draft.year = Some(seed.year);
        draft.genre = Some(seed.genre.to_owned());
        draft.summary = Some(seed.summary.to_owned());
        draft.characters = Some(seed.characters.to_owned());
        draft.themes = Some(seed.themes.to_owned());
        draft.full_text = seed.full_text.map(str::to_owned);
        draft.quotes = seed.quotes.iter().map(|q| (*q).to_owned()).collect();
        catalog
            .upsert_work(&draft.validate(WorkId::new(seed.id))?)
            .await?;
        report.works += 1;
    }

    for seed in &QUIZZES {
        let mut quiz = Quiz::new(
            QuizId::new(seed.id),
            seed.title,
            seed.work.map(WorkId::new),
            seed.question_count,
            seed.difficulty,
            seed.quiz_type,
        )?;
        quiz.special_icon = seed.icon.map(str::to_owned);
        quiz.questions = Some(seed.questions.to_owned());
        quiz.time_minutes = Some(seed.minutes);
        catalog.upsert_quiz(&quiz).await?;
        report.quizzes += 1;
    }

    info!(
        authors = report.authors,
        works = report.works,
        quizzes = report.quizzes,
        "catalog seeded"
    );
    Ok(report)
}
